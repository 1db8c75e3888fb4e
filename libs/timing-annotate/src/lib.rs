use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::fold::Fold;
use syn::{parse_macro_input, parse_quote, Block, ImplItemFn, Item, ItemFn, TraitItemFn};

/// Wraps the body of a function, or of every function in an impl or trait, in a `timing` span named after the
/// enclosing module and function.
#[proc_macro_attribute]
pub fn timing(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as Item);

    let output = match item {
        Item::Fn(item_fn) => Item::Fn(SpanInserter.fold_item_fn(item_fn)),
        Item::Impl(item_impl) => Item::Impl(SpanInserter.fold_item_impl(item_impl)),
        Item::Trait(item_trait) => Item::Trait(SpanInserter.fold_item_trait(item_trait)),
        other => {
            return syn::Error::new_spanned(other, "timing can only annotate functions, impls and traits")
                .to_compile_error()
                .into()
        }
    };

    quote!(#output).into()
}

struct SpanInserter;

impl SpanInserter {
    fn wrap(name: &str, block: Block) -> Block {
        let body: TokenStream2 = quote!(#block);

        parse_quote!({
            let _timing_guard = ::timing::start_guard(concat!(module_path!(), "::", #name));
            #body
        })
    }
}

impl Fold for SpanInserter {
    fn fold_item_fn(&mut self, item: ItemFn) -> ItemFn {
        let name = item.sig.ident.to_string();

        ItemFn {
            block: Box::new(Self::wrap(&name, *item.block)),
            ..item
        }
    }

    fn fold_impl_item_fn(&mut self, item: ImplItemFn) -> ImplItemFn {
        let name = item.sig.ident.to_string();

        ImplItemFn {
            block: Self::wrap(&name, item.block),
            ..item
        }
    }

    fn fold_trait_item_fn(&mut self, item: TraitItemFn) -> TraitItemFn {
        let name = item.sig.ident.to_string();

        TraitItemFn {
            default: item.default.map(|block| Self::wrap(&name, block)),
            ..item
        }
    }

    fn fold_item(&mut self, item: Item) -> Item {
        // Nested items keep their own annotations.
        item
    }
}
