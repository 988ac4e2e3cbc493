pub mod fit;
pub mod fonts;
pub mod layout;
