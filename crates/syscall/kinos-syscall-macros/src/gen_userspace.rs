//! `userspace` feature: raw `syscall` stubs and one typed wrapper per entry.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::model::SyscallDefs;

pub(crate) fn generate(defs: &SyscallDefs) -> TokenStream {
    let raw_stubs = gen_raw_stubs();
    let wrappers = gen_typed_wrappers(defs);

    quote! {
        #[cfg(all(feature = "userspace", target_arch = "x86_64"))]
        #raw_stubs

        #[cfg(all(feature = "userspace", target_arch = "x86_64"))]
        #wrappers
    }
}

/// `syscall0` through `syscall6`.
///
/// KinOS ABI: `RAX` = number, arguments in `RDI`, `RSI`, `RDX`, `R10`,
/// `R8`, `R9`. The kernel returns the value in `RAX` and the errno in `RDX`.
fn gen_raw_stubs() -> TokenStream {
    quote! {
        /// Raw `syscall` instruction wrappers.
        ///
        /// KinOS ABI: `RAX` = syscall number, arguments in `RDI`, `RSI`,
        /// `RDX`, `R10`, `R8`, `R9`. The result comes back as `RAX` = value,
        /// `RDX` = errno. `RCX` and `R11` are clobbered by the instruction
        /// itself; the remaining argument registers may be clobbered by the
        /// kernel.
        pub mod raw {
            use super::SyscallResult;

            #[inline(always)]
            #[allow(clippy::cast_possible_truncation, reason = "errno travels in the low 32 bits of RDX")]
            fn result(value: u64, error: u64) -> SyscallResult {
                SyscallResult { value, error: error as i32 }
            }

            /// Issue a syscall with 0 arguments.
            #[inline(always)]
            pub fn syscall0(nr: u64) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: `syscall` is the defined user-to-kernel transition.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        lateout("rdx") error,
                        lateout("rcx") _,
                        lateout("r11") _,
                        lateout("rdi") _,
                        lateout("rsi") _,
                        lateout("r8") _,
                        lateout("r9") _,
                        lateout("r10") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }

            /// Issue a syscall with 1 argument.
            #[inline(always)]
            pub fn syscall1(nr: u64, a0: u64) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: As `syscall0`, one argument in RDI.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        inlateout("rdi") a0 => _,
                        lateout("rdx") error,
                        lateout("rcx") _,
                        lateout("r11") _,
                        lateout("rsi") _,
                        lateout("r8") _,
                        lateout("r9") _,
                        lateout("r10") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }

            /// Issue a syscall with 2 arguments.
            #[inline(always)]
            pub fn syscall2(nr: u64, a0: u64, a1: u64) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: As `syscall0`, arguments in RDI, RSI.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        inlateout("rdi") a0 => _,
                        inlateout("rsi") a1 => _,
                        lateout("rdx") error,
                        lateout("rcx") _,
                        lateout("r11") _,
                        lateout("r8") _,
                        lateout("r9") _,
                        lateout("r10") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }

            /// Issue a syscall with 3 arguments.
            #[inline(always)]
            pub fn syscall3(nr: u64, a0: u64, a1: u64, a2: u64) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: As `syscall0`, arguments in RDI, RSI, RDX.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        inlateout("rdi") a0 => _,
                        inlateout("rsi") a1 => _,
                        inlateout("rdx") a2 => error,
                        lateout("rcx") _,
                        lateout("r11") _,
                        lateout("r8") _,
                        lateout("r9") _,
                        lateout("r10") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }

            /// Issue a syscall with 4 arguments.
            #[inline(always)]
            pub fn syscall4(nr: u64, a0: u64, a1: u64, a2: u64, a3: u64) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: As `syscall0`, arguments in RDI, RSI, RDX, R10.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        inlateout("rdi") a0 => _,
                        inlateout("rsi") a1 => _,
                        inlateout("rdx") a2 => error,
                        inlateout("r10") a3 => _,
                        lateout("rcx") _,
                        lateout("r11") _,
                        lateout("r8") _,
                        lateout("r9") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }

            /// Issue a syscall with 5 arguments.
            #[inline(always)]
            pub fn syscall5(nr: u64, a0: u64, a1: u64, a2: u64, a3: u64, a4: u64) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: As `syscall0`, arguments in RDI, RSI, RDX, R10, R8.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        inlateout("rdi") a0 => _,
                        inlateout("rsi") a1 => _,
                        inlateout("rdx") a2 => error,
                        inlateout("r10") a3 => _,
                        inlateout("r8") a4 => _,
                        lateout("rcx") _,
                        lateout("r11") _,
                        lateout("r9") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }

            /// Issue a syscall with 6 arguments.
            #[inline(always)]
            #[allow(clippy::too_many_arguments, reason = "mirrors the register ABI")]
            pub fn syscall6(
                nr: u64,
                a0: u64,
                a1: u64,
                a2: u64,
                a3: u64,
                a4: u64,
                a5: u64,
            ) -> SyscallResult {
                let (value, error): (u64, u64);
                // SAFETY: As `syscall0`, arguments in RDI, RSI, RDX, R10, R8, R9.
                unsafe {
                    core::arch::asm!(
                        "syscall",
                        inlateout("rax") nr => value,
                        inlateout("rdi") a0 => _,
                        inlateout("rsi") a1 => _,
                        inlateout("rdx") a2 => error,
                        inlateout("r10") a3 => _,
                        inlateout("r8") a4 => _,
                        inlateout("r9") a5 => _,
                        lateout("rcx") _,
                        lateout("r11") _,
                        options(nostack),
                    );
                }
                result(value, error)
            }
        }
    }
}

fn gen_typed_wrappers(defs: &SyscallDefs) -> TokenStream {
    let wrappers = defs.syscalls.iter().map(|syscall| {
        let fn_name = syscall.method_ident();
        let const_name = syscall.const_ident();
        let attrs = &syscall.attrs;
        let syscall_fn = format_ident!("syscall{}", syscall.args.len());
        let params = syscall.args.iter().map(|a| {
            let name = &a.name;
            let ty = &a.ty;
            quote! { #name: #ty }
        });
        let arg_names = syscall.args.iter().map(|a| &a.name);

        quote! {
            #(#attrs)*
            #[inline]
            pub fn #fn_name(#(#params),*) -> SyscallResult {
                raw::#syscall_fn(#const_name #(, #arg_names)*)
            }
        }
    });

    quote! {
        /// Typed wrappers, one per syscall.
        pub mod wrappers {
            use super::*;
            #(#wrappers)*
        }
    }
}
