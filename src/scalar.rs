use std::fmt::{Debug, Display};

use num_traits::NumAssign;

/// Numeric element bound shared by every container in the crate.
///
/// Satisfied by the primitive integers and floats; anything that is a plain
/// copyable number with zero/one and the usual assigning arithmetic.
pub trait Scalar: Copy + Default + PartialOrd + NumAssign + Debug + Display + 'static {}

impl<T> Scalar for T where T: Copy + Default + PartialOrd + NumAssign + Debug + Display + 'static {}
