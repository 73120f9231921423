use std::io::{self, BufRead, Write};

use crate::cdse::ProductRecord;

/// Resolves which of the listed candidates to retrieve. Implementations
/// return 0-based indices into the candidate slice, in selection order.
pub trait SelectionSource {
    fn resolve(&self, products: &[ProductRecord]) -> io::Result<Vec<usize>>;
}

/// Permissive 1-based index parsing: tokens are split on commas and trimmed;
/// anything that is not an integer in [1, len] is silently skipped.
pub fn parse_indices(input: &str, len: usize) -> Vec<usize> {
    input
        .split(',')
        .filter_map(|token| token.trim().parse::<usize>().ok())
        .filter(|&number| number >= 1 && number <= len)
        .map(|number| number - 1)
        .collect()
}

fn listing(products: &[ProductRecord]) -> String {
    let mut lines = String::new();
    for (i, product) in products.iter().enumerate() {
        lines.push_str(&format!(
            "{}. {} | Date: {} | Id: {}\n",
            i + 1,
            product.name,
            product.acquisition_date,
            product.id
        ));
    }
    lines
}

/// Prints the candidate listing and reads one line of comma-separated
/// product numbers from the operator.
pub struct InteractivePrompt;

impl SelectionSource for InteractivePrompt {
    fn resolve(&self, products: &[ProductRecord]) -> io::Result<Vec<usize>> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "\nFound {} product(s):\n", products.len())?;
        out.write_all(listing(products).as_bytes())?;
        write!(out, "\nEnter product numbers to download (comma-separated): ")?;
        out.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(parse_indices(&line, products.len()))
    }
}

/// Non-interactive stand-in: every candidate.
pub struct SelectAll;

impl SelectionSource for SelectAll {
    fn resolve(&self, products: &[ProductRecord]) -> io::Result<Vec<usize>> {
        Ok((0..products.len()).collect())
    }
}

/// Non-interactive stand-in: a pre-supplied comma-separated index string,
/// run through the same permissive parser as the prompt.
pub struct IndexList(String);

impl IndexList {
    pub fn new<S: Into<String>>(input: S) -> Self {
        Self(input.into())
    }
}

impl SelectionSource for IndexList {
    fn resolve(&self, products: &[ProductRecord]) -> io::Result<Vec<usize>> {
        Ok(parse_indices(&self.0, products.len()))
    }
}
