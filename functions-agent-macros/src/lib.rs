use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, AttributeArgs, FnArg, GenericArgument, ItemFn, Lit, Meta, NestedMeta,
    Pat, PathArguments, ReturnType, Type,
};
use proc_macro_crate::{crate_name, FoundCrate};

/// Resolve host crate path (equivalent to `$crate`) and the string form used by
/// `#[serde(crate = "...")]`.
fn host_crate() -> (proc_macro2::TokenStream, String) {
    match crate_name("functions-agent") {
        Ok(FoundCrate::Itself) => (quote!(crate), "crate".to_string()),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
            (quote!(::#ident), name)
        }
        Err(_) => (quote!(::functions_agent), "functions_agent".to_string()),
    }
}

/// Turn a free function into a `Tool`.
///
/// ```ignore
/// #[tool(
///     name = "TextAnalysis",
///     description = "Analyze text and provide insights",
///     params(text = "The text to analyze")
/// )]
/// fn text_analysis(text: String) -> String { ... }
/// ```
///
/// generates `TextAnalysisParams` (serde arguments) and `TextAnalysisTool`
/// (the `Tool` impl). Functions may be async and may return either `String` or
/// `Result<String, E: Display>`. `Option<T>` parameters are advertised as not
/// required. A function with exactly one `String` parameter also accepts a bare
/// JSON string as its input.
#[proc_macro_attribute]
pub fn tool(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as AttributeArgs);
    let input_fn = parse_macro_input!(item as ItemFn);

    let mut name_override = None;
    let mut description = None;
    let mut params_meta = Vec::<(String, String)>::new();

    for nested in args {
        match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) => {
                if let Some(ident) = nv.path.get_ident() {
                    if let Lit::Str(s) = nv.lit {
                        match ident.to_string().as_str() {
                            "name" => name_override = Some(s.value()),
                            "description" => description = Some(s.value()),
                            _ => {}
                        }
                    }
                }
            }
            NestedMeta::Meta(Meta::List(list)) if list.path.is_ident("params") => {
                for nm in list.nested {
                    if let NestedMeta::Meta(Meta::NameValue(nv)) = nm {
                        if let (Some(ident), Lit::Str(s)) = (nv.path.get_ident(), &nv.lit) {
                            params_meta.push((ident.to_string(), s.value()));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let description = match description {
        Some(d) => d,
        None => {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                "tool requires `description = \"...\"`",
            )
            .to_compile_error()
            .into();
        }
    };

    let fn_ident = input_fn.sig.ident.clone();
    let fn_name = fn_ident.to_string();
    let tool_name = name_override.unwrap_or(fn_name.clone());

    let mut fields = Vec::new();
    let mut param_names = Vec::new();

    for arg in &input_fn.sig.inputs {
        match arg {
            FnArg::Typed(pt) => {
                if let Pat::Ident(pi) = &*pt.pat {
                    fields.push((pi.ident.clone(), (*pt.ty).clone()));
                    param_names.push(pi.ident.to_string());
                } else {
                    return syn::Error::new_spanned(&pt.pat, "only simple identifiers are supported")
                        .to_compile_error()
                        .into();
                }
            }
            FnArg::Receiver(_) => {
                return syn::Error::new_spanned(arg, "methods with self are not supported")
                    .to_compile_error()
                    .into();
            }
        }
    }

    for (k, _) in &params_meta {
        if !param_names.contains(k) {
            return syn::Error::new_spanned(
                &input_fn.sig.ident,
                format!("param '{}' not found in function signature", k),
            )
            .to_compile_error()
            .into();
        }
    }

    let params_struct_ident =
        syn::Ident::new(&format!("{}Params", pascal_case(&fn_name)), fn_ident.span());
    let tool_struct_ident =
        syn::Ident::new(&format!("{}Tool", pascal_case(&fn_name)), fn_ident.span());

    let (host, host_name) = host_crate();
    let serde_path = syn::LitStr::new(&format!("{}::serde", host_name), fn_ident.span());

    let field_defs = fields.iter().map(|(id, ty)| {
        if option_inner(ty).is_some() {
            quote!(#[serde(default)] pub #id: #ty)
        } else {
            quote!(pub #id: #ty)
        }
    });

    let args_entries = fields.iter().map(|(ident, ty)| {
        let desc = params_meta
            .iter()
            .find(|(k, _)| k == &ident.to_string())
            .map(|(_, v)| v.clone())
            .unwrap_or_default();

        if desc.is_empty() {
            return syn::Error::new_spanned(
                ident,
                format!("missing description for param '{}'", ident),
            )
            .to_compile_error();
        }

        let (arg_type, required) = match option_inner(ty) {
            Some(inner) => (infer_json_type(inner), false),
            None => (infer_json_type(ty), true),
        };
        let name_lit = syn::LitStr::new(&ident.to_string(), ident.span());
        let desc_lit = syn::LitStr::new(&desc, ident.span());

        quote! {
            #host::tools::traits::ArgSchema {
                name: #name_lit.into(),
                arg_type: #arg_type.into(),
                description: #desc_lit.into(),
                required: #required,
            }
        }
    });

    // Single-input tools take whatever string the model hands over.
    let normalize = match fields.as_slice() {
        [(ident, ty)] if is_string(ty) => {
            let name_lit = syn::LitStr::new(&ident.to_string(), ident.span());
            quote!(let input = #host::tools::traits::single_arg_input(input, #name_lit);)
        }
        _ => quote!(),
    };

    let call_args = fields.iter().map(|(id, _)| quote!(params.#id));
    let call = if input_fn.sig.asyncness.is_some() {
        quote!(#fn_ident(#(#call_args),*).await)
    } else {
        quote!(#fn_ident(#(#call_args),*))
    };

    let returns_result = match &input_fn.sig.output {
        ReturnType::Type(_, ty) => last_ident(ty).is_some_and(|i| i == "Result"),
        ReturnType::Default => false,
    };
    let finish = if returns_result {
        quote! {
            #call.map_err(|e| #host::tools::error::ToolError::ExecutionError {
                name: #tool_name.to_string(),
                reason: e.to_string(),
            })
        }
    } else {
        quote!(Ok(#call))
    };

    let expanded = quote! {
        #input_fn

        #[derive(#host::serde::Deserialize)]
        #[serde(crate = #serde_path)]
        pub struct #params_struct_ident {
            #(#field_defs,)*
        }

        pub struct #tool_struct_ident;

        #[#host::async_trait::async_trait]
        impl #host::tools::traits::Tool for #tool_struct_ident {
            fn name(&self) -> &str { #tool_name }
            fn description(&self) -> &str { #description }
            fn args(&self) -> Vec<#host::tools::traits::ArgSchema> {
                vec![#(#args_entries),*]
            }
            async fn run(
                &self,
                input: #host::serde_json::Value,
            ) -> Result<String, #host::tools::error::ToolError> {
                #normalize
                let params: #params_struct_ident =
                    #host::serde_json::from_value(input)
                        .map_err(|e| #host::tools::error::ToolError::ParamsNotMatched(e.to_string()))?;
                #finish
            }
        }
    };

    TokenStream::from(expanded)
}

fn pascal_case(s: &str) -> String {
    s.split('_')
        .map(|p| {
            let mut c = p.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join("")
}

fn last_ident(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        _ => None,
    }
}

fn is_string(ty: &Type) -> bool {
    last_ident(ty).is_some_and(|i| i == "String")
}

/// `Some(T)` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else { return None };
    let seg = p.path.segments.last()?;
    if seg.ident != "Option" {
        return None;
    }
    match &seg.arguments {
        PathArguments::AngleBracketed(ab) => match ab.args.first()? {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

fn infer_json_type(ty: &Type) -> &'static str {
    match last_ident(ty).as_deref() {
        Some("String") => "string",
        Some("bool") => "boolean",
        Some("i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "usize" | "isize") => {
            "integer"
        }
        Some("f32" | "f64") => "number",
        Some("Vec") => "array",
        _ => "object",
    }
}
