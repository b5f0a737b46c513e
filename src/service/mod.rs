// ============================================================================
// Service Layer
// ============================================================================

pub mod orders;
