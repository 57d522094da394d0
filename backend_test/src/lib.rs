use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, spanned::Spanned, FnArg, GenericArgument, Ident, ItemFn, Pat, PathArguments,
    Signature, Type,
};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that the throwaway test database is dropped regardless of how
/// the test terminates.
///
/// Injectable dependencies are [`rocket::local::asynchronous::Client`],
/// [`mongodb::Database`], and [`crate::model::mongodb::Coll<T>`].
#[proc_macro_attribute]
pub fn backend_test(_args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let (test_args, collection_idents, collection_types) = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Connect to Mongo and spin up a server against a fresh database.
            async fn provision() -> (rocket::local::asynchronous::Client, mongodb::Database) {
                let db_client = crate::db_client().await;
                let db_name = crate::database();
                let rocket_client = rocket::local::asynchronous::Client::tracked(
                    crate::rocket_for_db(db_client.clone(), &db_name).await,
                )
                .await
                .unwrap();
                let db = db_client.database(&db_name);

                (rocket_client, db)
            }

            /// The test itself.
            #item_fn

            // Separate runtimes for inside and outside the `catch_unwind`.
            let harness_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-harness")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            let test_runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("test-body")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            let (rocket_client, db) = harness_runtime.block_on(provision());

            // Run the test, catching any panics.
            // Mutexes safely transfer the `!UnwindSafe` handles into the closure.
            let client_mutex = std::sync::Mutex::new(rocket_client);
            let db_mutex = std::sync::Mutex::new(db.clone());
            let runtime_mutex = std::sync::Mutex::new(test_runtime);
            let result = std::panic::catch_unwind(|| {
                let rocket_client = client_mutex.into_inner().unwrap();
                let db = db_mutex.into_inner().unwrap();
                let runtime = runtime_mutex.into_inner().unwrap();

                #(
                    let #collection_idents = crate::model::mongodb::Coll::<#collection_types>::from_db(&db);
                )*

                runtime.block_on(#new_name(#(#test_args),* #(,#collection_idents)*));
            });

            // Drop the throwaway database whether or not the test passed,
            // then re-raise any panic.
            harness_runtime.block_on(async { db.drop(None).await.unwrap() });
            if let Err(cause) = result {
                std::panic::panic_any(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
#[allow(clippy::type_complexity)]
fn check_sig(sig: Signature) -> Result<(Vec<TokenStream2>, Vec<Ident>, Vec<Ident>), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_db = false;
    let mut args = vec![];
    let mut collection_idents = vec![];
    let mut collection_types = vec![];

    for input in &sig.inputs {
        match classify_param(input) {
            Some(Param::RocketClient) if !has_client => {
                has_client = true;
                args.push(quote! { rocket_client });
            }
            Some(Param::Db) if !has_db => {
                has_db = true;
                args.push(quote! { db });
            }
            Some(Param::Collection(ident, ty)) => {
                collection_idents.push(ident);
                collection_types.push(ty);
            }
            Some(Param::RocketClient) | Some(Param::Db) => {
                return Err(syn::Error::new(
                    input.span(),
                    "Test cannot accept `Client` or `Database` more than once",
                ));
            }
            None => {
                return Err(syn::Error::new(
                    input.span(),
                    "Expected one of `client_ident: Client`, `db_ident: Database` or `collection_ident: Coll<T>`",
                ));
            }
        }
    }

    Ok((args, collection_idents, collection_types))
}

enum Param {
    RocketClient,
    Db,
    Collection(Ident, Ident),
}

/// Recognise an injectable parameter, or `None` for anything else.
fn classify_param(input: &FnArg) -> Option<Param> {
    let FnArg::Typed(pat_type) = input else {
        return None;
    };
    let Pat::Ident(pat_ident) = &*pat_type.pat else {
        return None;
    };
    let Type::Path(type_path) = &*pat_type.ty else {
        return None;
    };

    if let Some(type_ident) = type_path.path.get_ident() {
        return match type_ident.to_string().as_str() {
            "Client" => Some(Param::RocketClient),
            "Database" => Some(Param::Db),
            _ => None,
        };
    }

    // Not a bare ident, so look for `Coll<T>` by its last path segment.
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Coll" {
        return None;
    }
    let PathArguments::AngleBracketed(generics) = &segment.arguments else {
        return None;
    };
    let Some(GenericArgument::Type(Type::Path(inner))) = generics.args.first() else {
        return None;
    };
    let type_ident = inner.path.get_ident()?;
    Some(Param::Collection(pat_ident.ident.clone(), type_ident.clone()))
}
