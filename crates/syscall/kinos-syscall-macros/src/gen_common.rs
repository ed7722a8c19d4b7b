//! Items emitted regardless of feature: errno and `SYS_*` constants, the
//! `Syscall` enum, and the table's own tests.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::model::SyscallDefs;

pub(crate) fn generate(defs: &SyscallDefs) -> TokenStream {
    let errors = gen_errors(defs);
    let syscall_consts = gen_syscall_constants(defs);
    let syscall_enum = gen_syscall_enum(defs);
    let tests = gen_tests(defs);

    quote! {
        #errors
        #syscall_consts
        #syscall_enum
        #tests
    }
}

fn gen_errors(defs: &SyscallDefs) -> TokenStream {
    let items = defs.errors.iter().map(|e| {
        let attrs = &e.attrs;
        let name = &e.name;
        let value = &e.value;
        quote! {
            #(#attrs)*
            pub const #name: i32 = #value;
        }
    });

    let names = defs.errors.iter().map(|e| &e.name);
    let name_strs = defs.errors.iter().map(|e| e.name.to_string());

    quote! {
        #(#items)*

        /// Returns the symbolic name of an errno value, if it is one of ours.
        #[must_use]
        pub const fn errno_name(errno: i32) -> Option<&'static str> {
            match errno {
                #(#names => Some(#name_strs),)*
                _ => None,
            }
        }
    }
}

fn gen_syscall_constants(defs: &SyscallDefs) -> TokenStream {
    let items = defs.syscalls.iter().map(|s| {
        let attrs = &s.attrs;
        let const_name = s.const_ident();
        let number = s.number;
        quote! {
            #(#attrs)*
            pub const #const_name: u64 = #number;
        }
    });
    let count = defs.syscalls.len();

    quote! {
        #(#items)*

        /// Number of entries in the syscall table.
        pub const SYSCALL_COUNT: usize = #count;
    }
}

fn gen_syscall_enum(defs: &SyscallDefs) -> TokenStream {
    let mut sorted: Vec<_> = defs.syscalls.iter().collect();
    sorted.sort_by_key(|s| s.number);

    let mut variants = Vec::new();
    let mut all = Vec::new();
    let mut from_nr_arms = Vec::new();
    let mut nr_arms = Vec::new();
    let mut name_arms = Vec::new();
    let mut arg_count_arms = Vec::new();
    let mut args_arms = Vec::new();

    for syscall in &sorted {
        let variant = format_ident!("{}", to_pascal(&syscall.name.to_string()));
        let number = syscall.number;
        let name_str = syscall.name.to_string();
        let arg_count = syscall.args.len();
        let attrs = &syscall.attrs;
        let arg_names = syscall.args.iter().map(|a| a.name.to_string());

        variants.push(quote! { #(#attrs)* #variant });
        all.push(quote! { Self::#variant });
        from_nr_arms.push(quote! { #number => Some(Self::#variant) });
        nr_arms.push(quote! { Self::#variant => #number });
        name_arms.push(quote! { Self::#variant => #name_str });
        arg_count_arms.push(quote! { Self::#variant => #arg_count });
        args_arms.push(quote! { Self::#variant => &[#(#arg_names),*] });
    }

    let count = sorted.len();

    quote! {
        /// Every syscall in the table.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Syscall {
            #(#variants,)*
        }

        impl Syscall {
            /// The whole table in number order.
            pub const ALL: [Self; #count] = [#(#all),*];

            /// Look up a syscall by number.
            #[must_use]
            pub const fn from_nr(nr: u64) -> Option<Self> {
                match nr {
                    #(#from_nr_arms,)*
                    _ => None,
                }
            }

            /// This syscall's number.
            #[must_use]
            pub const fn nr(self) -> u64 {
                match self {
                    #(#nr_arms,)*
                }
            }

            /// This syscall's `snake_case` name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    #(#name_arms,)*
                }
            }

            /// How many of the six argument registers this syscall reads.
            #[must_use]
            pub const fn arg_count(self) -> usize {
                match self {
                    #(#arg_count_arms,)*
                }
            }

            /// Argument names in register order.
            #[must_use]
            pub const fn args(self) -> &'static [&'static str] {
                match self {
                    #(#args_arms,)*
                }
            }
        }
    }
}

fn gen_tests(defs: &SyscallDefs) -> TokenStream {
    let error_checks = defs.errors.iter().map(|e| {
        let name = &e.name;
        let name_str = e.name.to_string();
        quote! {
            assert!(#name > 0, concat!("error code ", #name_str, " must be positive"));
            assert_eq!(errno_name(#name), Some(#name_str));
        }
    });

    quote! {
        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn table_is_dense_and_ordered() {
                for (i, syscall) in Syscall::ALL.iter().enumerate() {
                    assert_eq!(syscall.nr(), i as u64, "`{}` out of place", syscall.name());
                    assert_eq!(Syscall::from_nr(syscall.nr()), Some(*syscall));
                    assert_eq!(syscall.args().len(), syscall.arg_count());
                }
                assert_eq!(Syscall::ALL.len(), SYSCALL_COUNT);
                assert_eq!(Syscall::from_nr(SYSCALL_COUNT as u64), None);
            }

            #[test]
            fn error_numbers_positive_and_named() {
                #(#error_checks)*
                assert_eq!(errno_name(0), None);
            }
        }
    }
}

/// `put_string` -> `PutString`
fn to_pascal(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
