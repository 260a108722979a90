mod composite_file_loader;
mod markdown_section_splitter;
mod mock_file_loader;
mod pdf_adapter;
mod plain_text_adapter;
mod recursive_character_splitter;
mod text_sanitizer;
mod text_splitter_factory;

pub use composite_file_loader::CompositeFileLoader;
pub use markdown_section_splitter::MarkdownSectionSplitter;
pub use mock_file_loader::MockFileLoader;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use recursive_character_splitter::RecursiveCharacterSplitter;
pub use text_sanitizer::sanitize_extracted_text;
pub use text_splitter_factory::TextSplitterFactory;
