//! Shared chumsky parsers for edge statements
//!
//! The repair passes never parse the whole diagram language. The only
//! structure they need is where the edge operators sit on a line, which
//! these combinators provide.

use chumsky::prelude::*;

use super::EdgeOperator;

/// A line split at its edge operators.
///
/// `A --> B <-- C` becomes head `"A "` followed by the links
/// `(-->, " B ")` and `(<--, " C")`. Segments keep their surrounding
/// whitespace so callers decide how to trim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeChain<'src> {
    pub head: &'src str,
    pub links: Vec<(EdgeOperator, &'src str)>,
}

impl EdgeChain<'_> {
    /// Number of edge operators on the line
    pub fn operator_count(&self) -> usize {
        self.links.len()
    }
}

/// Parse one canonical edge operator.
///
/// Alternatives are ordered longest first so `<-->` is never read as `<--`
/// followed by a stray `>`.
pub fn edge_operator<'src>() -> impl Parser<'src, &'src str, EdgeOperator> + Clone {
    just("<-->")
        .to(EdgeOperator::Bidirectional)
        .or(just("-->").to(EdgeOperator::Forward))
        .or(just("<--").to(EdgeOperator::Reverse))
}

/// Parse the (possibly empty) text between two operators.
pub fn chain_segment<'src>() -> impl Parser<'src, &'src str, &'src str> + Clone {
    any().and_is(edge_operator().not()).repeated().to_slice()
}

/// Parse a full line into its operator-separated segments.
pub fn edge_chain<'src>() -> impl Parser<'src, &'src str, EdgeChain<'src>> + Clone {
    chain_segment()
        .then(
            edge_operator()
                .then(chain_segment())
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
        .map(|(head, links)| EdgeChain { head, links })
}

/// Split a line at its edge operators.
///
/// Every input is accepted; a line without operators comes back as a
/// single head segment.
pub fn split_edge_chain(line: &str) -> EdgeChain<'_> {
    edge_chain()
        .parse(line)
        .into_result()
        .unwrap_or_else(|_| EdgeChain {
            head: line,
            links: Vec::new(),
        })
}
