//! `kernel` feature: the `SyscallHandler` trait and `dispatch()`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use crate::model::SyscallDefs;

pub(crate) fn generate(defs: &SyscallDefs) -> TokenStream {
    let trait_def = gen_handler_trait(defs);
    let dispatch_fn = gen_dispatch(defs);

    quote! {
        #[cfg(feature = "kernel")]
        #trait_def

        #[cfg(feature = "kernel")]
        #dispatch_fn
    }
}

fn gen_handler_trait(defs: &SyscallDefs) -> TokenStream {
    let methods = defs.syscalls.iter().map(|syscall| {
        let method_name = syscall.method_ident();
        let attrs = &syscall.attrs;
        let params = syscall.args.iter().map(|a| {
            let name = &a.name;
            let ty = &a.ty;
            quote! { #name: #ty }
        });
        quote! {
            #(#attrs)*
            fn #method_name(&self, #(#params),*) -> SyscallResult;
        }
    });

    quote! {
        /// One method per syscall; implemented by the kernel.
        ///
        /// Arguments arrive exactly as they were in the registers. Decoding
        /// them (pointers in particular) is the implementation's job.
        pub trait SyscallHandler {
            #(#methods)*
        }
    }
}

fn gen_dispatch(defs: &SyscallDefs) -> TokenStream {
    let max_args = defs.max_args();
    let bound: Vec<_> = (0..max_args).map(|i| format_ident!("a{}", i)).collect();

    let match_arms = defs.syscalls.iter().map(|syscall| {
        let method_name = syscall.method_ident();
        let const_name = syscall.const_ident();
        let arg_names = &bound[..syscall.args.len()];
        quote! {
            #const_name => handler.#method_name(#(#arg_names),*)
        }
    });

    quote! {
        /// Routes `nr` to the matching [`SyscallHandler`] method.
        ///
        /// Numbers outside the table yield `ENOSYS`.
        pub fn dispatch<H: SyscallHandler + ?Sized>(
            handler: &H,
            nr: u64,
            args: [u64; 6],
        ) -> SyscallResult {
            let [#(#bound,)* ..] = args;
            match nr {
                #(#match_arms,)*
                _ => SyscallResult::err(ENOSYS),
            }
        }
    }
}
