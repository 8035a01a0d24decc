//! Error handling for PatternKit
//!
//! Provides the error taxonomy shared by every geometry engine:
//! - Malformed figure errors (structural invariant violations)
//! - Unsupported geometry errors (valid structure, operation preconditions unmet)
//! - Invalid dart specification errors
//!
//! All error types use `thiserror` and are returned as values, never panicked,
//! so the host can show a recoverable message.

use thiserror::Error;

/// Malformed figure error type
///
/// Raised by figure validation when a structural invariant is violated.
/// Validation never repairs a figure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedFigureError {
    /// An edge references a node that does not exist in the figure
    #[error("Edge {edge_id} references missing node {node_id}")]
    MissingNode {
        /// The offending edge.
        edge_id: String,
        /// The id that could not be resolved.
        node_id: String,
    },

    /// Two nodes share the same id
    #[error("Duplicate node id {id}")]
    DuplicateNodeId {
        /// The duplicated id.
        id: String,
    },

    /// Two edges share the same id
    #[error("Duplicate edge id {id}")]
    DuplicateEdgeId {
        /// The duplicated id.
        id: String,
    },

    /// A closed figure whose edges are not exactly one cycle over all nodes
    #[error("Closed figure {figure_id} is not a single cycle: {reason}")]
    BrokenCycle {
        /// The figure being validated.
        figure_id: String,
        /// What was wrong with the cycle.
        reason: String,
    },

    /// An open figure whose edges are not a simple path
    #[error("Open figure {figure_id} is not a simple path: {reason}")]
    BrokenPath {
        /// The figure being validated.
        figure_id: String,
        /// What was wrong with the path.
        reason: String,
    },

    /// A node position or handle is NaN or infinite
    #[error("Node {node_id} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending node.
        node_id: String,
    },
}

/// Unsupported geometry error type
///
/// The figure is structurally valid but the requested operation cannot run on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnsupportedGeometryError {
    /// The operation requires a closed outline
    #[error("Figure {figure_id} must be closed for {operation}")]
    OpenOutline {
        /// The figure passed in.
        figure_id: String,
        /// The operation that was requested.
        operation: String,
    },

    /// The outline has fewer nodes than the operation needs
    #[error("Figure {figure_id} has {found} nodes, {operation} needs at least {required}")]
    TooFewNodes {
        /// The figure passed in.
        figure_id: String,
        /// The operation that was requested.
        operation: String,
        /// Node count found.
        found: usize,
        /// Minimum node count.
        required: usize,
    },

    /// The geometry collapsed or has zero extent
    #[error("Degenerate geometry in {figure_id}: {reason}")]
    Degenerate {
        /// The figure passed in.
        figure_id: String,
        /// Why the geometry is unusable.
        reason: String,
    },

    /// An auxiliary parameter is out of range
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Invalid dart specification error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidDartSpecError {
    /// The node is not part of the figure's outline
    #[error("Dart node {node_id} is not on the outline of {figure_id}")]
    NotOnOutline {
        /// The figure passed in.
        figure_id: String,
        /// The node that could not be found.
        node_id: String,
    },

    /// Two of apex/left leg/right leg refer to the same node
    #[error("Dart nodes must be distinct, {node_id} is used twice")]
    CoincidentNodes {
        /// The repeated node.
        node_id: String,
    },

    /// The unfolded outline would have fewer than three nodes
    #[error("Unfolding would collapse the outline to {remaining} nodes")]
    WouldCollapse {
        /// Node count after merging.
        remaining: usize,
    },

    /// A leg sits on top of the apex, so there is no rotation to apply
    #[error("Dart leg {node_id} coincides with the apex")]
    DegenerateLeg {
        /// The zero-length leg.
        node_id: String,
    },
}

/// Main error type for PatternKit
///
/// A unified error type that can represent any error from the geometry engines.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Structural invariant violation
    #[error(transparent)]
    Malformed(#[from] MalformedFigureError),

    /// Operation preconditions unmet
    #[error(transparent)]
    UnsupportedGeometry(#[from] UnsupportedGeometryError),

    /// Dart legs or apex invalid
    #[error(transparent)]
    InvalidDartSpec(#[from] InvalidDartSpecError),
}

impl Error {
    /// Check if this is a structural error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed(_))
    }

    /// Check if this is an unsupported geometry error
    pub fn is_unsupported_geometry(&self) -> bool {
        matches!(self, Error::UnsupportedGeometry(_))
    }

    /// Check if this is a dart specification error
    pub fn is_invalid_dart_spec(&self) -> bool {
        matches!(self, Error::InvalidDartSpec(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
