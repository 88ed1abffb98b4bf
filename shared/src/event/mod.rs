pub mod adapter_data;
pub mod remote_event;
