use std::time::Instant;

use tracing::{error, info};

use literate::failure::Failure;
use literate::sample::Sample;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleReport {
    pub descriptor: String,
    pub failures: Vec<Failure>,
}

impl SampleReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: String,
    pub samples: Vec<SampleReport>,
}

impl FileReport {
    pub fn passed(&self) -> usize {
        self.samples.iter().filter(|s| s.passed()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &SampleReport> {
        self.samples.iter().filter(|s| !s.passed())
    }
}

/// Per-document pass/fail bookkeeping for a run.
///
/// Failures are attributed by descriptor, so failures recorded while a
/// document is being composed land on the right sample before it is checked.
#[derive(Debug, Default)]
pub struct Tracker {
    files: Vec<FileReport>,
    started: Option<(String, Instant)>,
}

impl Tracker {
    pub fn new() -> Self {
        Tracker::default()
    }

    pub fn start_file(&mut self, path: &str) {
        info!("---- BEGIN FILE {}", path);
        self.files.push(FileReport {
            path: path.to_string(),
            samples: Vec::new(),
        });
    }

    pub fn start_sample(&mut self, sample: &Sample) {
        info!("BEGIN #{}", sample.descriptor);
        self.report_for(&sample.descriptor);
        self.started = Some((sample.descriptor.clone(), Instant::now()));
    }

    pub fn finish_sample(&mut self) {
        if let Some((descriptor, started)) = self.started.take() {
            info!("END #{} ({} ms)", descriptor, started.elapsed().as_millis());
        }
    }

    pub fn record(&mut self, failure: Failure) {
        error!("{}", failure);
        for detail in &failure.details {
            info!("{}", detail);
        }
        self.report_for(&failure.descriptor).failures.push(failure);
    }

    pub fn record_all(&mut self, failures: impl IntoIterator<Item = Failure>) {
        for failure in failures {
            self.record(failure);
        }
    }

    fn report_for(&mut self, descriptor: &str) -> &mut SampleReport {
        if self.files.is_empty() {
            self.start_file("(unknown)");
        }
        let last = self.files.len() - 1;
        let samples = &mut self.files[last].samples;
        let index = match samples.iter().position(|s| s.descriptor == descriptor) {
            Some(index) => index,
            None => {
                samples.push(SampleReport {
                    descriptor: descriptor.to_string(),
                    failures: Vec::new(),
                });
                samples.len() - 1
            }
        };
        &mut samples[index]
    }

    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    pub fn current_file(&self) -> Option<&FileReport> {
        self.files.last()
    }

    pub fn passed(&self) -> usize {
        self.files.iter().map(FileReport::passed).sum()
    }

    pub fn total(&self) -> usize {
        self.files.iter().map(|f| f.samples.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.passed() < self.total()
    }
}
