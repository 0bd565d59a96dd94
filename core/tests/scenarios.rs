use flowheater_core::{
    analyze_package, parse_source, AppError, InputParam, InputVar, NativeTypes, OutputContract,
    StepKind, TypeIdentity,
};
use pretty_assertions::assert_eq;

fn step(kind: StepKind, name: &str, var: &str, ty: TypeIdentity, deps: Vec<InputVar>) -> InputParam {
    InputParam {
        kind,
        name: name.into(),
        var: var.into(),
        ty,
        deps,
        resolver: None,
        fallible: kind != StepKind::String,
    }
}

#[test]
fn test_path_segments_and_natives() {
    let code = r#"
        use http::{Request, ResponseWriter};

        /// Path: /users
        pub struct Users;

        impl Users {
            /// Path: /{name}/{id}
            pub fn get(&self, name: String, id: i32, w: ResponseWriter, r: &Request) {}
        }
    "#;

    let package = parse_source("rest", code).unwrap();
    let collection = analyze_package(&package, &NativeTypes::default()).unwrap();
    let endpoint = &collection.services[0].endpoints[0];

    assert_eq!(
        endpoint.steps,
        vec![
            step(StepKind::String, "name", "v0", TypeIdentity::new("", "String"), vec![]),
            step(StepKind::String, "id", "v1", TypeIdentity::new("", "String"), vec![]),
            step(
                StepKind::Convert,
                "id",
                "v2",
                TypeIdentity::new("", "i32"),
                vec![InputVar::plain("v1")]
            ),
        ]
    );
    assert_eq!(
        endpoint.args,
        vec![
            InputVar::plain("v0"),
            InputVar::plain("v2"),
            InputVar::plain("w"),
            InputVar::plain("r"),
        ]
    );
    assert_eq!(endpoint.output, OutputContract::Neither);
    assert!(collection.resolvers.is_empty());
}

#[test]
fn test_fallible_resolver() {
    let code = r#"
        /// Path: /account
        pub struct Account;

        impl Account {
            /// Path: /
            pub fn show(&self, user: CurrentUser) -> Result<Profile, Error> {
                todo!()
            }
        }

        /// Resolve: true
        pub fn current_user(token: String) -> Result<CurrentUser, Error> {
            todo!()
        }
    "#;

    let package = parse_source("rest", code).unwrap();
    let collection = analyze_package(&package, &NativeTypes::default()).unwrap();
    let endpoint = &collection.services[0].endpoints[0];

    let user = TypeIdentity::new("rest", "CurrentUser");
    let mut resolve = step(
        StepKind::Resolve,
        "user",
        "v1",
        user.clone(),
        vec![InputVar::plain("v0")],
    );
    resolve.resolver = Some("current_user".into());

    assert_eq!(
        endpoint.steps,
        vec![
            step(StepKind::String, "token", "v0", TypeIdentity::new("", "String"), vec![]),
            resolve,
        ]
    );
    assert_eq!(endpoint.args, vec![InputVar::plain("v1")]);
    assert_eq!(endpoint.output, OutputContract::Both);

    assert_eq!(collection.resolvers.len(), 1);
    assert_eq!(collection.resolvers[0].ty, user);
    assert!(collection.resolvers[0].fallible);
}

#[test]
fn test_second_payload_conflicts() {
    let code = r#"
        /// Path: /orders
        pub struct Orders;

        impl Orders {
            /// Path: /
            /// Method: POST
            pub fn create(&self, a: NewOrder, b: Coupon) {}
        }
    "#;

    let package = parse_source("rest", code).unwrap();
    let err = analyze_package(&package, &NativeTypes::default()).unwrap_err();

    match err.root() {
        AppError::PayloadConflict { param, conflicting } => {
            assert_eq!(param, "b");
            assert_eq!(conflicting, "a");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err
        .to_string()
        .starts_with("analyzing service Orders: analyzing endpoint create: resolving parameter b: "));
}

#[test]
fn test_invalid_resolver_stops_analysis() {
    let code = r#"
        /// Path: /broken
        pub struct Broken;

        impl Broken {
            /// Path: /
            pub fn get(&self, a: A, b: B) {}
        }

        /// Resolve: true
        pub fn tokens() -> (Token, Token, Token) {
            todo!()
        }
    "#;

    let package = parse_source("rest", code).unwrap();
    let err = analyze_package(&package, &NativeTypes::default()).unwrap_err();

    match err.root() {
        AppError::InvalidSignature { owner, reason } => {
            assert_eq!(owner, "tokens");
            assert!(reason.contains("too many return values (3)"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_plan_serializes() {
    let code = r#"
        /// Path: /items/
        pub struct Items;

        impl Items {
            /// Path: /{id}
            /// Method: put
            pub fn update(&self, id: u64, item: &Item) -> Result<(), Error> {
                todo!()
            }
        }
    "#;

    let package = parse_source("rest", code).unwrap();
    let collection = analyze_package(&package, &NativeTypes::default()).unwrap();
    let json = serde_json::to_value(&collection).unwrap();

    let endpoint = &json["services"][0]["endpoints"][0];
    assert_eq!(endpoint["method"], "PUT");
    assert_eq!(endpoint["output"], "error");
    assert_eq!(endpoint["steps"][2]["kind"], "payload");
    assert_eq!(endpoint["args"][1]["deref"], 1);

    let items = &collection.services[0];
    assert_eq!(items.route(&items.endpoints[0]), "/items/{id}");
}

#[test]
fn test_resolver_reading_body_rejected() {
    let code = r#"
        /// Path: /orders
        pub struct Orders;

        impl Orders {
            /// Path: /
            /// Method: POST
            pub fn create(&self, order: Validated) {}
        }

        /// Resolve: true
        pub fn validate(body: NewOrder) -> Result<Validated, Error> {
            todo!()
        }
    "#;

    let package = parse_source("rest", code).unwrap();
    let err = analyze_package(&package, &NativeTypes::default()).unwrap_err();

    match err.root() {
        AppError::ResolverPayload { resolver, param } => {
            assert_eq!(resolver, "validate");
            assert_eq!(param, "body");
        }
        other => panic!("unexpected error: {other}"),
    }
}
