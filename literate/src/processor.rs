use std::collections::HashMap;

use tracing::debug;

use crate::directive::{Directive, DirectiveContext};
use crate::error::ExtractError;
use crate::sample::{Kind, Prefix, Sample, descriptor_for};
use crate::scanner::SampleConsumer;

#[derive(Debug, Clone)]
struct IdMarker {
    id: String,
    descriptor: String,
}

/// Turns scanner events into sample records for one document.
pub struct Processor<'a> {
    slug: &'a str,
    source_file: &'a str,
    context: DirectiveContext,
    line_num: usize,
    section_header: Option<String>,
    in_comment_block: bool,
    next_id: Option<IdMarker>,
    next_kind: Option<Kind>,
    /// Every id recorded so far, with the descriptor where it first appeared.
    seen: HashMap<String, String>,
    samples: Vec<Sample>,
}

impl<'a> Processor<'a> {
    pub fn new(slug: &'a str, source_file: &'a str) -> Self {
        Processor {
            slug,
            source_file,
            context: DirectiveContext::new(),
            line_num: 0,
            section_header: None,
            in_comment_block: false,
            next_id: None,
            next_kind: None,
            seen: HashMap::new(),
            samples: Vec::new(),
        }
    }

    pub fn context(&self) -> &DirectiveContext {
        &self.context
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl SampleConsumer for Processor<'_> {
    fn set_line_num(&mut self, line: usize) {
        self.line_num = line;
    }

    fn set_header(&mut self, header: &str) {
        self.context.reset();
        self.section_header = Some(header.to_string());
        self.next_id = None;
    }

    fn set_directive(&mut self, directive: &str) -> Result<(), ExtractError> {
        let directive = Directive::parse(directive)?;
        debug!(?directive, line = self.line_num, "directive");
        self.context.apply(directive);
        Ok(())
    }

    fn set_next_id(&mut self, id: &str, line: usize) {
        self.next_id = Some(IdMarker {
            id: id.to_string(),
            descriptor: descriptor_for(self.source_file, line),
        });
    }

    fn set_next_language(&mut self, language: Option<&str>) {
        self.next_kind = Some(Kind::from_tag(language));
    }

    fn set_in_comment_block(&mut self, in_comment_block: bool) {
        self.in_comment_block = in_comment_block;
    }

    fn add_sample(&mut self, content: &str) -> Result<(), ExtractError> {
        let kind = self.next_kind.clone().unwrap_or(Kind::Untyped);

        if self.next_id.is_none() && kind.is_checkable(self.context.check_js) {
            let id = format!("{}-{}", self.slug, self.line_num + 1);
            self.next_id = Some(IdMarker {
                id,
                descriptor: descriptor_for(self.source_file, self.line_num),
            });
        }

        // Untagged blocks without an id are not samples.
        let Some(marker) = self.next_id.take() else {
            return Ok(());
        };

        if let Some(first) = self.seen.get(&marker.id) {
            return Err(ExtractError::DuplicateId {
                id: marker.id,
                first: first.clone(),
            });
        }
        self.seen.insert(marker.id.clone(), marker.descriptor.clone());

        let next = self.context.take_next();
        let target_filename = next.prepend.as_ref().and_then(|p| p.as_file.clone());

        let sample = Sample {
            id: marker.id.clone(),
            descriptor: marker.descriptor,
            kind,
            content: content.to_string(),
            section_header: self.section_header.clone(),
            options: next.options,
            node_modules: self.context.node_modules.clone(),
            is_tsx: next.is_tsx,
            check_js: next.check_js,
            source_file: self.source_file.to_string(),
            line_number: self.line_num,
            prefixes: self.context.prefixes.clone(),
            prefixes_length: 0,
            replacement_id: next.replacement_id,
            target_filename,
            auxiliary_files: Vec::new(),
            skip: next.skip || self.context.done_with_file,
            in_comment_block: self.in_comment_block,
            original_content: None,
            output: None,
        };

        if let Some(prepend) = next.prepend {
            self.context.prefixes.push(Prefix {
                id: marker.id,
                lines: prepend.lines,
            });
        }

        self.samples.push(sample);
        Ok(())
    }

    fn reset_with_normal_line(&mut self) {
        self.next_id = None;
        self.next_kind = None;
        self.context.clear_next();
    }
}
