pub mod wait_task_service;
