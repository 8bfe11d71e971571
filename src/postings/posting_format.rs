use super::skip_list::SkipListFormat;

/// Which optional channels a term's posting data carries.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostingFormat {
    has_tflist: bool,
    has_tf_bitmap: bool,
    has_doc_payload: bool,
    has_fieldmap: bool,
    has_position_list: bool,
    has_position_payload: bool,
    has_term_payload: bool,
}

#[derive(Default)]
pub struct PostingFormatBuilder {
    format: PostingFormat,
}

impl PostingFormatBuilder {
    pub fn with_tflist(mut self) -> Self {
        self.format.has_tflist = true;
        self
    }

    /// Per-document term frequencies are kept in a bitmap beside the
    /// position list instead of the doc list.
    pub fn with_tf_bitmap(mut self) -> Self {
        self.format.has_tf_bitmap = true;
        self
    }

    pub fn with_doc_payload(mut self) -> Self {
        self.format.has_doc_payload = true;
        self
    }

    pub fn with_fieldmap(mut self) -> Self {
        self.format.has_fieldmap = true;
        self
    }

    pub fn with_position_list(mut self) -> Self {
        self.format.has_position_list = true;
        self
    }

    pub fn with_position_payload(mut self) -> Self {
        self.format.has_position_payload = true;
        self
    }

    pub fn with_term_payload(mut self) -> Self {
        self.format.has_term_payload = true;
        self
    }

    pub fn build(self) -> PostingFormat {
        let mut format = self.format;
        if format.has_tf_bitmap {
            format.has_position_list = true;
            format.has_tflist = false;
        }
        if format.has_position_payload {
            format.has_position_list = true;
        }
        if format.has_position_list && !format.has_tf_bitmap {
            format.has_tflist = true;
        }
        format
    }
}

impl PostingFormat {
    pub fn builder() -> PostingFormatBuilder {
        PostingFormatBuilder::default()
    }

    pub fn has_tflist(&self) -> bool {
        self.has_tflist
    }

    pub fn has_tf_bitmap(&self) -> bool {
        self.has_tf_bitmap
    }

    /// Whether per-document term frequencies are recorded at all.
    pub fn has_term_freq(&self) -> bool {
        self.has_tflist || self.has_tf_bitmap
    }

    pub fn has_doc_payload(&self) -> bool {
        self.has_doc_payload
    }

    pub fn has_fieldmap(&self) -> bool {
        self.has_fieldmap
    }

    pub fn has_position_list(&self) -> bool {
        self.has_position_list
    }

    pub fn has_position_payload(&self) -> bool {
        self.has_position_payload
    }

    pub fn has_term_payload(&self) -> bool {
        self.has_term_payload
    }

    /// Doc list skip items carry the running tf sum when a tf list exists.
    pub fn doc_skip_list_format(&self) -> SkipListFormat {
        SkipListFormat::builder().with_value(self.has_tflist).build()
    }

    pub fn position_skip_list_format(&self) -> SkipListFormat {
        SkipListFormat::default()
    }
}
