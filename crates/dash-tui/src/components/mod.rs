pub mod charts_panel;
pub mod export_dialog;
pub mod help_overlay;
pub mod log_panel;
pub mod song_table;
