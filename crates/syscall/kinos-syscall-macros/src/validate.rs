//! Compile-time checks on the parsed table.
//!
//! The trap entry indexes the table directly, so numbers must be unique and
//! dense from zero. The `syscall` ABI carries at most six arguments.

use std::collections::{HashMap, HashSet};

use crate::model::SyscallDefs;

const MAX_ARGS: usize = 6;

/// Returns every problem found, not just the first.
pub(crate) fn validate(defs: &SyscallDefs) -> Result<(), Vec<syn::Error>> {
    let mut errors = Vec::new();

    let mut error_names = HashSet::new();
    let mut error_values: HashMap<i64, &syn::Ident> = HashMap::new();
    for err in &defs.errors {
        let val: i64 = match err.value.base10_parse() {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        if val <= 0 {
            errors.push(syn::Error::new(
                err.name.span(),
                format!("error code `{}` must be positive, got {val}", err.name),
            ));
        }
        if !error_names.insert(err.name.to_string()) {
            errors.push(syn::Error::new(
                err.name.span(),
                format!("duplicate error name `{}`", err.name),
            ));
        }
        if let Some(prev) = error_values.insert(val, &err.name) {
            errors.push(syn::Error::new(
                err.name.span(),
                format!("error code value {val} already used by `{prev}`"),
            ));
        }
    }

    let count = defs.syscalls.len() as u64;
    let mut numbers: HashMap<u64, String> = HashMap::new();
    for syscall in &defs.syscalls {
        if let Some(prev) = numbers.insert(syscall.number, syscall.name.to_string()) {
            errors.push(syn::Error::new(
                syscall.span,
                format!(
                    "syscall `{}` number {:#x} collides with `{prev}`",
                    syscall.name, syscall.number
                ),
            ));
        }
        if syscall.number >= count {
            errors.push(syn::Error::new(
                syscall.span,
                format!(
                    "syscall `{}` number {:#x} leaves a hole in a table of {count} entries",
                    syscall.name, syscall.number
                ),
            ));
        }
        if syscall.args.len() > MAX_ARGS {
            errors.push(syn::Error::new(
                syscall.span,
                format!(
                    "syscall `{}` has {} arguments, max is {MAX_ARGS}",
                    syscall.name,
                    syscall.args.len()
                ),
            ));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
