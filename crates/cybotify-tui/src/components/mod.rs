pub mod header;
pub mod help_overlay;
pub mod log_panel;
pub mod playlist_index;
pub mod radar_panel;
pub mod track_list;
