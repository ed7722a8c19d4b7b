//! Parsed form of the DSL.

use proc_macro2::Span;
use syn::{Attribute, Ident, LitInt, Type};

/// Everything inside one `define_syscalls!` invocation.
pub(crate) struct SyscallDefs {
    pub errors: Vec<ErrorDef>,
    pub syscalls: Vec<SyscallDef>,
}

/// `EBADF = 9;`
pub(crate) struct ErrorDef {
    pub attrs: Vec<Attribute>,
    pub name: Ident,
    pub value: LitInt,
}

/// `fn put_string(fd: u64, buf: u64, len: u64) = 0x01;`
pub(crate) struct SyscallDef {
    pub attrs: Vec<Attribute>,
    pub name: Ident,
    pub args: Vec<ArgDef>,
    pub number: u64,
    pub span: Span,
}

pub(crate) struct ArgDef {
    pub name: Ident,
    pub ty: Type,
}

impl SyscallDefs {
    /// Largest argument count of any syscall in the table.
    pub fn max_args(&self) -> usize {
        self.syscalls.iter().map(|s| s.args.len()).max().unwrap_or(0)
    }
}

impl SyscallDef {
    /// `SYS_PUT_STRING` for `put_string`.
    pub fn const_ident(&self) -> Ident {
        quote::format_ident!("SYS_{}", self.name.to_string().to_uppercase())
    }

    /// `sys_put_string` for `put_string`.
    pub fn method_ident(&self) -> Ident {
        quote::format_ident!("sys_{}", self.name)
    }
}
