//! Scoped wall-clock timing.
//!
//! [`measure`] and [`measure_async`] open a [`TimingSample`], run the work and
//! close the sample before handing back the work's output, so a failed
//! operation is still timed up to the point it failed. The sample is closed by
//! a drop guard, which also covers panics and dropped futures.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::core::BenchError;

/// Start and end instants of one named operation.
#[derive(Debug, Clone)]
pub struct TimingSample {
    title: String,
    start: Instant,
    end: Option<Instant>,
}

impl TimingSample {
    /// Opens a sample starting now.
    pub fn open(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            start: Instant::now(),
            end: None,
        }
    }

    /// Sets the end instant. A sample can only be closed once.
    pub fn close(&mut self) -> Result<(), BenchError> {
        if self.end.is_some() {
            return Err(BenchError::Timer(format!(
                "sample '{}' is already closed",
                self.title
            )));
        }
        self.end = Some(Instant::now());
        Ok(())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    pub fn duration(&self) -> Result<Duration, BenchError> {
        match self.end {
            Some(end) => Ok(end.duration_since(self.start)),
            None => Err(BenchError::Timer(format!(
                "sample '{}' is still open",
                self.title
            ))),
        }
    }
}

impl fmt::Display for TimingSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.duration() {
            Ok(d) => write!(f, "{}: {}", self.title, d.as_secs_f64()),
            Err(_) => write!(f, "{}: running", self.title),
        }
    }
}

/// The output of a timed unit of work alongside its closed sample.
#[derive(Debug)]
pub struct Measured<T> {
    pub sample: TimingSample,
    pub value: T,
}

struct CloseOnDrop<'a>(&'a mut TimingSample);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        if self.0.end.is_none() {
            self.0.end = Some(Instant::now());
        }
        if std::thread::panicking() {
            warn!("{} (aborted by panic)", self.0);
        }
    }
}

pub fn measure<T>(title: impl Into<String>, work: impl FnOnce() -> T) -> Measured<T> {
    let mut sample = TimingSample::open(title);
    let value = {
        let _guard = CloseOnDrop(&mut sample);
        work()
    };
    info!("{sample}");
    Measured { sample, value }
}

/// Like [`measure`], for a future. The clock starts before the future is first
/// polled, so any scheduling the future does is inside the sample.
pub async fn measure_async<F>(title: impl Into<String>, work: F) -> Measured<F::Output>
where
    F: Future,
{
    let mut sample = TimingSample::open(title);
    let value = {
        let _guard = CloseOnDrop(&mut sample);
        work.await
    };
    info!("{sample}");
    Measured { sample, value }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_duration_requires_close() {
        let mut sample = TimingSample::open("open");
        assert!(matches!(sample.duration(), Err(BenchError::Timer(_))));
        assert_eq!(sample.to_string(), "open: running");

        sample.close().unwrap();
        assert!(sample.is_closed());
        assert!(sample.duration().is_ok());
    }

    #[test]
    fn test_close_only_once() {
        let mut sample = TimingSample::open("twice");
        sample.close().unwrap();
        let first = sample.duration().unwrap();
        assert!(matches!(sample.close(), Err(BenchError::Timer(_))));
        assert_eq!(sample.duration().unwrap(), first);
    }

    #[test]
    fn test_measure_includes_work() {
        let Measured { sample, value } = measure("sleep", || {
            thread::sleep(Duration::from_millis(20));
            7
        });
        assert_eq!(value, 7);
        assert_eq!(sample.title(), "sleep");
        assert!(sample.duration().unwrap() >= Duration::from_millis(20));
    }

    #[test]
    fn test_measure_closes_on_error() {
        let Measured { sample, value } = measure("fails", || -> Result<(), BenchError> {
            thread::sleep(Duration::from_millis(5));
            Err(BenchError::backend("memory", "boom"))
        });
        assert!(value.is_err());
        assert!(sample.is_closed());
        assert!(sample.duration().unwrap() >= Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_measure_async_includes_suspension() {
        let Measured { sample, value } = measure_async("async sleep", async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            "done"
        })
        .await;
        assert_eq!(value, "done");
        assert!(sample.duration().unwrap() >= Duration::from_millis(20));
    }

    #[test]
    fn test_display_format() {
        let Measured { sample, .. } = measure("noop", || ());
        let line = sample.to_string();
        let (title, secs) = line.split_once(": ").unwrap();
        assert_eq!(title, "noop");
        assert!(secs.parse::<f64>().unwrap() >= 0.0);
    }
}
