pub mod discovery;
pub mod export;

pub use discovery::{discover_pages, is_page_file, load_page};
pub use export::{export_regions, output_dir_for};
