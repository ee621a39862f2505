//! Reader for the textual API signature format (`api.txt`).
//!
//! ```text
//! // Signature format: 3.0
//! package test.pkg {
//!   public class Foo {
//!     ctor public Foo();
//!     method public String? name(int index);
//!     field public static final int MAX = 4; // 0x4
//!   }
//! }
//! ```

mod parser;
mod text;

pub use parser::{parse_signature, SignatureFormat};
