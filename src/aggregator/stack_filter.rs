//! Reduce raw call stacks to application frames.
//!
//! A raw stack is walked innermost-first. Frames from the runtime, from
//! native code and constructor entries are skipped until the first frame
//! that belongs to the application; that frame is the method the sample is
//! charged to.

use crate::utils::config::StackFilterConfig;
use serde::{Deserialize, Serialize};

/// Why a sample produced no method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The stack mentions the profiler's own packages
    Profiler,
    /// Every frame was runtime, native or constructor code
    NoApplicationFrame,
    /// The innermost application frame is benchmark harness code
    Harness,
}

/// Outcome of filtering one stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteredStack<'a> {
    /// Frames from the first application frame outward
    Application(&'a [String]),
    Rejected(Rejection),
}

impl<'a> FilteredStack<'a> {
    /// The method charged for the sample, if any
    pub fn method(&self) -> Option<&'a str> {
        match self {
            FilteredStack::Application(frames) => frames.first().map(String::as_str),
            FilteredStack::Rejected(_) => None,
        }
    }
}

/// Stack trace filter built from namespace lists
#[derive(Debug, Clone)]
pub struct StackFilter {
    runtime_namespaces: Vec<String>,
    profiler_packages: Vec<String>,
    harness_packages: Vec<String>,
}

impl Default for StackFilter {
    fn default() -> Self {
        Self::new(&StackFilterConfig::default())
    }
}

impl StackFilter {
    pub fn new(config: &StackFilterConfig) -> Self {
        Self {
            runtime_namespaces: config.runtime_namespaces.clone(),
            profiler_packages: config.profiler_packages.clone(),
            harness_packages: config.harness_packages.clone(),
        }
    }

    /// Whether a single frame counts as application code
    ///
    /// A frame is skipped when it has no namespace separator, starts with a
    /// runtime namespace, is a constructor or static initializer, or is a
    /// native frame (shared object, C++ scope or bracketed synthetic frame).
    /// Runtime namespaces only match as a prefix, so an application package
    /// that nests a segment named `java` is kept.
    pub fn is_application_frame(&self, frame: &str) -> bool {
        if !frame.contains('.') {
            return false;
        }
        if self
            .runtime_namespaces
            .iter()
            .any(|namespace| frame.starts_with(namespace.as_str()))
        {
            return false;
        }
        if frame.contains("<init>") || frame.contains("<clinit>") {
            return false;
        }
        !is_native_frame(frame)
    }

    /// Frames from the first application frame outward, or `None`
    ///
    /// Idempotent: filtering the returned slice again yields the same slice.
    pub fn application_frames<'a>(&self, frames: &'a [String]) -> Option<&'a [String]> {
        frames
            .iter()
            .position(|frame| self.is_application_frame(frame))
            .map(|start| &frames[start..])
    }

    /// Whether the stack was taken inside the profiler itself
    pub fn is_profiler_stack(&self, frames: &[String]) -> bool {
        frames.iter().any(|frame| {
            self.profiler_packages
                .iter()
                .any(|package| frame.contains(package.as_str()))
        })
    }

    /// Whether a frame belongs to the benchmark harness
    pub fn is_harness_frame(&self, frame: &str) -> bool {
        self.harness_packages
            .iter()
            .any(|package| frame.contains(package.as_str()))
    }

    /// Apply every rule to one raw stack
    pub fn filter<'a>(&self, frames: &'a [String]) -> FilteredStack<'a> {
        if self.is_profiler_stack(frames) {
            return FilteredStack::Rejected(Rejection::Profiler);
        }
        match self.application_frames(frames) {
            None => FilteredStack::Rejected(Rejection::NoApplicationFrame),
            Some(app) if self.is_harness_frame(&app[0]) => {
                FilteredStack::Rejected(Rejection::Harness)
            }
            Some(app) => FilteredStack::Application(app),
        }
    }
}

/// `.so` as a file extension, `::` scopes, or `[...]` markers
fn is_native_frame(frame: &str) -> bool {
    if frame.contains("::") || frame.contains('[') || frame.contains(']') {
        return true;
    }
    frame.match_indices(".so").any(|(index, _)| {
        frame[index + 3..]
            .chars()
            .next()
            .map_or(true, |next| !next.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(frames: &[&str]) -> Vec<String> {
        frames.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_skips_runtime_and_native_frames() {
        let filter = StackFilter::default();
        let frames = stack(&[
            "libjvm.so",
            "java.util.HashMap.get",
            "Interpreter",
            "org.h2.Engine.<init>",
            "std::vector::push",
            "[unknown]",
            "org.h2.Engine.query",
            "org.dacapo.harness.Callback.start",
        ]);

        let app = filter.application_frames(&frames).unwrap();
        assert_eq!(app[0], "org.h2.Engine.query");
        assert_eq!(filter.filter(&frames).method(), Some("org.h2.Engine.query"));
    }

    #[test]
    fn test_nested_runtime_name_is_kept() {
        let filter = StackFilter::default();
        assert!(filter.is_application_frame("org.example.java.Parser.parse"));
        assert!(filter.is_application_frame("com.acme.solver.Solve.run"));
        assert!(!filter.is_application_frame("javax.crypto.Cipher.init"));
        assert!(!filter.is_application_frame("lib/libc.so.6"));
    }

    #[test]
    fn test_rejections() {
        let filter = StackFilter::default();

        let profiler = stack(&["org.h2.Engine.query", "chappie.Chaperone.sample"]);
        assert_eq!(
            filter.filter(&profiler),
            FilteredStack::Rejected(Rejection::Profiler)
        );

        let runtime_only = stack(&["java.lang.Thread.run", "main"]);
        assert_eq!(
            filter.filter(&runtime_only),
            FilteredStack::Rejected(Rejection::NoApplicationFrame)
        );

        let harness = stack(&["java.lang.Object.wait", "org.dacapo.harness.TestHarness.run"]);
        assert_eq!(
            filter.filter(&harness),
            FilteredStack::Rejected(Rejection::Harness)
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = StackFilter::default();
        let frames = stack(&["sun.misc.Unsafe.park", "org.h2.Engine.query", "java.lang.Thread.run"]);

        let once = filter.application_frames(&frames).unwrap();
        let twice = filter.application_frames(once).unwrap();
        assert_eq!(once, twice);
    }
}
