//! flowgate: firing-readiness decisions for converging gateways in a
//! token-based process model.
//!
//! The crate answers one question: may an inclusive (OR) join gateway fire
//! now, or must it keep waiting because some pending task instance could
//! still deliver a token to it? See [`runtime::gateway`] for the decision
//! entry point and [`runtime::reachability`] for the loop-safe search
//! underneath it.

pub mod graph;
pub mod runtime;
