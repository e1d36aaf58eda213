use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use rhai::{Engine, EvalAltResult, Map};
use stardecode_core::{Bindable, Binder, DecodeConfig, DecodeError, Value, convert};
use stardecode_rhai::{RhaiError, bind_script, eval_kwargs, kwargs, script_value};

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
struct Contact {
    name: String,
    age: i64,
    hobbies: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Bindable)]
struct Repo {
    #[kwarg(name = "file")]
    source_file: String,
    contact: Option<Contact>,
}

#[test]
fn bind_object_map_from_script() {
    let engine = Engine::new();
    let mut repo = Repo::default();
    bind_script(
        &engine,
        &Binder::default(),
        r#"
            let hobbies = ["movies", "horse riding"];
            #{
                file: "BUILD",
                contact: #{ name: "pablo", age: 36, hobbies: hobbies },
            }
        "#,
        &mut repo,
    )
    .unwrap();
    assert_eq!(
        repo,
        Repo {
            source_file: "BUILD".into(),
            contact: Some(Contact {
                name: "pablo".into(),
                age: 36,
                hobbies: vec!["movies".into(), "horse riding".into()],
            }),
        }
    );
}

#[test]
fn registered_function_binds_its_map_argument() {
    let repos: Rc<RefCell<Vec<Repo>>> = Rc::default();
    let sink = Rc::clone(&repos);

    let mut engine = Engine::new();
    engine.register_fn("repo", move |args: Map| -> Result<(), Box<EvalAltResult>> {
        let mut repo = Repo::default();
        stardecode_core::bind(&kwargs(&args), &mut repo).map_err(|e| e.to_string())?;
        sink.borrow_mut().push(repo);
        Ok(())
    });

    engine
        .run(r#"repo(#{ file: "a.star" }); repo(#{ file: "b.star" });"#)
        .unwrap();
    let files: Vec<_> = repos.borrow().iter().map(|r| r.source_file.clone()).collect();
    assert_eq!(files, vec!["a.star".to_string(), "b.star".to_string()]);

    let err = engine.run(r#"repo(#{ file: Fn("repo") });"#).unwrap_err();
    assert!(err.to_string().contains("unsupported script type 'function'"), "{err}");
}

#[test]
fn script_values_convert_to_host_values() {
    let engine = Engine::new();
    let value: rhai::Dynamic = engine.eval("#{ n: 1, xs: [1.5, (), true] }").unwrap();
    let converted = convert(&script_value(&value)).unwrap();
    let map = converted.as_map().unwrap();
    assert_eq!(map.get_str("n"), Some(&Value::Int(1)));
    assert_eq!(
        map.get_str("xs"),
        Some(&Value::Seq(vec![Value::Float(1.5), Value::Null, Value::Bool(true)]))
    );
}

#[test]
fn type_mismatch_surfaces_through_adapter() {
    let engine = Engine::new();
    let mut repo = Repo::default();
    let err = bind_script(
        &engine,
        &Binder::default(),
        "#{ contact: #{ age: \"old\" } }",
        &mut repo,
    )
    .unwrap_err();
    match err {
        RhaiError::Decode(DecodeError::TypeMismatch { path, .. }) => {
            assert_eq!(path.to_string(), "contact.age");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unused_keys_with_strict_binder() {
    let engine = Engine::new();
    let binder = Binder::new(DecodeConfig {
        error_unused: true,
        ..DecodeConfig::default()
    });
    let mut repo = Repo::default();
    let err = bind_script(&engine, &binder, "#{ file: \"x\", extra: 1 }", &mut repo).unwrap_err();
    assert!(matches!(
        err,
        RhaiError::Decode(DecodeError::UnusedArguments { .. })
    ));

    let args = eval_kwargs(&engine, "#{ file: \"x\" }").unwrap();
    assert_eq!(args.len(), 1);
}
