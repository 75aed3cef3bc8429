pub mod access;
pub mod attendance;
pub mod incharge;
pub mod intern;
pub mod leave;
pub mod performance;
