mod section_attribute_reader;
mod section_meta;

pub use section_attribute_reader::{InMemorySectionAttributeReader, SectionAttributeReader};
pub use section_meta::{SectionInfo, SectionMeta, SectionMetaWriter};
