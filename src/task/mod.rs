//! Tasks that make up the firmware as well as the resources they use.
pub mod alarm_settings;
pub mod alarm_trigger;
pub mod buttons;
pub mod display;
pub mod orchestrate;
pub mod resources;
pub mod rtc;
pub mod sound;
pub mod task_messages;
