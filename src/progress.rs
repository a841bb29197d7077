use std::io::Write;

/// Receives advisory progress while records are enriched
pub trait Progress {
    fn start(&mut self, total: usize);
    fn advance(&mut self, done: usize, total: usize);
    fn finish(&mut self);
}

/// Rewrites a single status line, normally on stderr
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        ConsoleProgress { out }
    }
}

impl ConsoleProgress<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

// Progress output is best effort, write errors are ignored.
impl<W: Write> Progress for ConsoleProgress<W> {
    fn start(&mut self, total: usize) {
        let _ = writeln!(self.out, "Processing {} transactions...", total);
    }

    fn advance(&mut self, done: usize, total: usize) {
        let _ = write!(self.out, "\rProcessing transaction {}/{}...", done, total);
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = write!(self.out, "\r{:50}\r", "");
        let _ = writeln!(self.out, "Processing completed!");
        let _ = self.out.flush();
    }
}

/// Discards progress
pub struct Silent;

impl Progress for Silent {
    fn start(&mut self, _total: usize) {}
    fn advance(&mut self, _done: usize, _total: usize) {}
    fn finish(&mut self) {}
}
