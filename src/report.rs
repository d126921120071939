// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::fmt::{self, Display, Formatter};

/// The category of a console message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LogKind {
	Usage,
	Info,
	Error,
	Success,
}

impl Display for LogKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Usage => "USAGE",
			Self::Info => "INFO",
			Self::Error => "ERROR",
			Self::Success => "SUCCESS",
		})
	}
}

/// Where progress and outcome messages go.
pub trait Reporter {
	fn report(&mut self, kind: LogKind, message: &str);

	fn info(&mut self, message: &str) {
		self.report(LogKind::Info, message);
	}

	fn error(&mut self, message: &str) {
		self.report(LogKind::Error, message);
	}

	fn success(&mut self, message: &str) {
		self.report(LogKind::Success, message);
	}
}

/// Prints each message to stdout as a single `[KIND] message` line.
#[derive(Debug, Default, Copy, Clone)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
	fn report(&mut self, kind: LogKind, message: &str) {
		println!("[{kind}] {message}");
	}
}

/// Collects messages in memory.
impl Reporter for Vec<(LogKind, String)> {
	fn report(&mut self, kind: LogKind, message: &str) {
		self.push((kind, message.to_owned()));
	}
}
