pub mod attach_addons;
pub mod extract_embedded_products;
pub mod extract_menu_html;
pub mod process_products;
