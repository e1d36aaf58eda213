use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Derive macro for keyword-argument binding targets.
///
/// Generates the record's field table and the glue the binder calls into:
///
/// - `impl Bindable` — `fields()` (one descriptor per field: name, override
///   name, required flag, declared shape) and `bind_field()`.
/// - `impl FromValue` — so the record can be nested in other records,
///   sequences and maps.
///
/// The struct must implement `Default`; absent arguments keep default values.
///
/// # Example
///
/// ```ignore
/// #[derive(Bindable, Default)]
/// pub struct Repo {
///     #[kwarg(name = "file")]
///     pub source_file: String,
///
///     #[kwarg(required)]
///     pub url: String,
///
///     #[kwarg(skip)]
///     pub resolved: bool,
/// }
/// ```
#[proc_macro_derive(Bindable, attributes(kwarg))]
pub fn derive_bindable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens,
        Err(e) => e.to_compile_error().into(),
    }
}

/// Parsed `#[kwarg(...)]` options of one field.
#[derive(Default)]
struct FieldOpts {
    name: Option<LitStr>,
    required: bool,
    skip: bool,
}

fn field_opts(field: &syn::Field) -> Result<FieldOpts, syn::Error> {
    let mut opts = FieldOpts::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("kwarg") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("argument name must not be empty"));
                }
                opts.name = Some(value);
            } else if meta.path.is_ident("required") {
                opts.required = true;
            } else if meta.path.is_ident("skip") {
                opts.skip = true;
            } else {
                return Err(meta.error("unknown kwarg option (expected name, required, skip)"));
            }
            Ok(())
        })?;
    }
    if opts.skip && (opts.required || opts.name.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "#[kwarg(skip)] cannot be combined with other options",
        ));
    }
    Ok(opts)
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Bindable does not support generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Bindable only supports structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Bindable only supports structs",
            ))
        }
    };

    let mut descriptor_tokens = Vec::new();
    let mut bind_arms = Vec::new();
    let mut keys: Vec<(String, &syn::Ident)> = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let opts = field_opts(field)?;
        if opts.skip {
            continue;
        }

        let ident_str = field_name.to_string();
        let ident_str = ident_str.strip_prefix("r#").unwrap_or(&ident_str).to_string();
        let field_ty = &field.ty;

        let key = opts
            .name
            .as_ref()
            .map_or_else(|| ident_str.clone(), LitStr::value);
        if let Some((_, other)) = keys.iter().find(|(k, _)| *k == key) {
            return Err(syn::Error::new_spanned(
                field_name,
                format!("argument name '{key}' is already bound by field '{other}'"),
            ));
        }
        keys.push((key, field_name));

        let rename = match &opts.name {
            Some(lit) => quote! { Some(#lit) },
            None => quote! { None },
        };
        let required = opts.required;
        let index = descriptor_tokens.len();

        descriptor_tokens.push(quote! {
            stardecode_core::record::FieldDescriptor {
                ident: #ident_str,
                rename: #rename,
                required: #required,
                shape: <#field_ty as stardecode_core::from_value::FromValue>::shape,
            }
        });

        bind_arms.push(quote! {
            #index => stardecode_core::from_value::FromValue::merge_value(
                &mut self.#field_name,
                __value,
                __binder,
            ),
        });
    }

    let expanded = quote! {
        impl stardecode_core::record::Bindable for #name {
            const NAME: &'static str = concat!(module_path!(), "::", stringify!(#name));

            fn fields() -> &'static [stardecode_core::record::FieldDescriptor] {
                const FIELDS: &[stardecode_core::record::FieldDescriptor] = &[
                    #(#descriptor_tokens),*
                ];
                FIELDS
            }

            fn bind_field(
                &mut self,
                __index: usize,
                __value: &stardecode_core::value::Value,
                __binder: &stardecode_core::bind::Binder,
            ) -> Result<(), stardecode_core::error::DecodeError> {
                match __index {
                    #(#bind_arms)*
                    _ => Ok(()),
                }
            }
        }

        impl stardecode_core::from_value::FromValue for #name {
            fn shape() -> stardecode_core::record::Shape {
                stardecode_core::record::Shape::Record {
                    name: <Self as stardecode_core::record::Bindable>::NAME,
                    fields: <Self as stardecode_core::record::Bindable>::fields,
                }
            }

            fn from_value(
                __value: &stardecode_core::value::Value,
                __binder: &stardecode_core::bind::Binder,
            ) -> Result<Self, stardecode_core::error::DecodeError> {
                let mut result = <Self as Default>::default();
                __binder.bind_nested(__value, &mut result)?;
                Ok(result)
            }

            fn merge_value(
                &mut self,
                __value: &stardecode_core::value::Value,
                __binder: &stardecode_core::bind::Binder,
            ) -> Result<(), stardecode_core::error::DecodeError> {
                __binder.bind_nested(__value, self)
            }
        }
    };

    Ok(TokenStream::from(expanded))
}
