pub mod extract_style_url;
pub mod generate_random_delay;
pub mod normalize;
pub mod write_menu;
