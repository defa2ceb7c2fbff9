use super::Point;
use std::io::Write;

/// What an emitted point is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A point on the branch.
    Branch,
    /// A local maximum of the likelihood along the branch.
    Likelihood,
    /// The best likelihood seen when no maximum was bracketed.
    Best,
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Branch => write!(f, "1"),
            Self::Likelihood => write!(f, "2"),
            Self::Best => write!(f, "3"),
        }
    }
}

/// Receiver of accepted points. The tracer only ever writes to it.
pub trait Sink {
    fn emit(&mut self, tag: Tag, point: &Point) -> std::io::Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, tag: Tag, point: &Point) -> std::io::Result<()> {
        (**self).emit(tag, point)
    }
}

/// Comma-separated lines `<tag>,<λ>,<x_1>,…,<x_n>` with fixed decimals.
pub struct Csv<W: Write> {
    writer: W,
    decimals: usize,
}

impl<W: Write> Csv<W> {
    pub fn new(writer: W, decimals: usize) -> Self {
        Self { writer, decimals }
    }
    pub fn into_inner(self) -> W {
        self.writer
    }
    pub fn line(&self, tag: Tag, point: &Point) -> String {
        let numbers = std::iter::once(point.lambda()).chain(point.profile().iter().copied());
        std::iter::once(tag.to_string())
            .chain(numbers.map(|v| format!("{:.*}", self.decimals, v)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<W: Write> Sink for Csv<W> {
    fn emit(&mut self, tag: Tag, point: &Point) -> std::io::Result<()> {
        let line = self.line(tag, point);
        writeln!(self.writer, "{}", line)
    }
}

/// Points kept in memory in emission order.
#[derive(Debug, Default, Clone)]
pub struct Record(Vec<(Tag, Point)>);

impl Record {
    pub fn points(&self) -> &[(Tag, Point)] {
        &self.0
    }
    /// Points carrying a given tag.
    pub fn tagged(&self, tag: Tag) -> impl Iterator<Item = &Point> {
        self.0.iter().filter(move |(t, _)| *t == tag).map(|(_, p)| p)
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn last(&self) -> Option<&Point> {
        self.0.last().map(|(_, p)| p)
    }
}

impl Sink for Record {
    fn emit(&mut self, tag: Tag, point: &Point) -> std::io::Result<()> {
        self.0.push((tag, point.clone()));
        Ok(())
    }
}
