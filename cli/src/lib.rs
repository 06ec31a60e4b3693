pub mod config_cmd;
