//! Proc-macro crate for the KinOS syscall table DSL.
//!
//! `define_syscalls!` takes the errno list and the dense syscall table and
//! expands to the ABI constants, the `Syscall` enum, the kernel-side
//! `SyscallHandler` trait with its `dispatch()` function, and the user-side
//! `syscall` instruction stubs.

mod gen_common;
mod gen_kernel;
mod gen_userspace;
mod model;
mod parse;
mod validate;

use proc_macro::TokenStream;
use syn::parse_macro_input;

use model::SyscallDefs;

/// Define the errno codes and the syscall table from a single DSL.
///
/// The invocation lives in `crates/syscall/kinos-syscall/src/lib.rs`.
#[proc_macro]
pub fn define_syscalls(input: TokenStream) -> TokenStream {
    let defs = parse_macro_input!(input as SyscallDefs);

    if let Err(errors) = validate::validate(&defs) {
        let mut combined = proc_macro2::TokenStream::new();
        for err in errors {
            combined.extend(err.to_compile_error());
        }
        return combined.into();
    }

    let common = gen_common::generate(&defs);
    let kernel = gen_kernel::generate(&defs);
    let userspace = gen_userspace::generate(&defs);

    let output = quote::quote! {
        #common
        #kernel
        #userspace
    };

    output.into()
}
