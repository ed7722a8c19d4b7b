//! `syn::Parse` implementations for the DSL.

use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Ident, LitInt, Token, Type, braced, parenthesized};

use crate::model::{ArgDef, ErrorDef, SyscallDef, SyscallDefs};

impl Parse for SyscallDefs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut errors = Vec::new();
        let mut syscalls = Vec::new();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            let content;
            braced!(content in input);

            match ident.to_string().as_str() {
                "errors" => {
                    while !content.is_empty() {
                        errors.push(content.call(parse_error)?);
                    }
                }
                "syscalls" => {
                    while !content.is_empty() {
                        syscalls.push(content.call(parse_syscall)?);
                    }
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("expected `errors` or `syscalls`, found `{other}`"),
                    ));
                }
            }
        }

        Ok(SyscallDefs { errors, syscalls })
    }
}

fn parse_error(input: ParseStream<'_>) -> syn::Result<ErrorDef> {
    let attrs = input.call(Attribute::parse_outer)?;
    let name: Ident = input.parse()?;
    input.parse::<Token![=]>()?;
    let value: LitInt = input.parse()?;
    input.parse::<Token![;]>()?;
    Ok(ErrorDef { attrs, name, value })
}

fn parse_syscall(input: ParseStream<'_>) -> syn::Result<SyscallDef> {
    let attrs = input.call(Attribute::parse_outer)?;
    let span = input.span();

    input.parse::<Token![fn]>()?;
    let name: Ident = input.parse()?;

    let args_content;
    parenthesized!(args_content in input);
    let args: Punctuated<ArgDef, Token![,]> =
        args_content.parse_terminated(parse_arg, Token![,])?;

    input.parse::<Token![=]>()?;
    let number_lit: LitInt = input.parse()?;
    let number: u64 = number_lit.base10_parse()?;
    input.parse::<Token![;]>()?;

    Ok(SyscallDef {
        attrs,
        name,
        args: args.into_iter().collect(),
        number,
        span,
    })
}

fn parse_arg(input: ParseStream<'_>) -> syn::Result<ArgDef> {
    let name: Ident = input.parse()?;
    input.parse::<Token![:]>()?;
    let ty: Type = input.parse()?;
    Ok(ArgDef { name, ty })
}
