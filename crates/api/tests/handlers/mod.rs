mod booking_test;
mod jobs_test;
mod leave_test;
mod middleware_test;
mod schedule_test;
