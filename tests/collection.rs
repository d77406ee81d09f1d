//! Path expression matching against a retained scene.

use std::rc::Rc;

use hydra_scene::collection::{
    CollectionExpressionEvaluator, MatchKind, PathExpression, PredicateLibrary, PredicateResult,
};
use hydra_scene::core::{
    ContainerHandle, DataSource, RetainedContainerDataSource, RetainedSampledDataSource,
};
use hydra_scene::scene::{AddedPrimEntry, RetainedSceneIndex, SceneIndexHandle};
use hydra_scene::schema::{
    MaterialBindingsSchema, PrimvarSchemaBuilder, PrimvarsSchema, PurposeSchema, VisibilitySchema,
    MATERIAL_BINDINGS, PRIMVARS, PURPOSE, VISIBILITY,
};
use hydra_scene::util::ScenePath;

fn p(s: &str) -> ScenePath {
    ScenePath::parse(s).unwrap()
}

fn prim_data(
    visible: bool,
    purpose: &str,
    primvars: &[&str],
    bindings: &[(&str, &str)],
) -> ContainerHandle {
    let primvars = PrimvarsSchema::build_retained(primvars.iter().map(|name| {
        let value = RetainedSampledDataSource::new(1);
        (*name, PrimvarSchemaBuilder::new().primvar_value(value).build())
    }));
    let bindings =
        MaterialBindingsSchema::build_retained(bindings.iter().map(|(purpose, path)| (*purpose, p(path))));
    RetainedContainerDataSource::new([
        (VISIBILITY, DataSource::Container(VisibilitySchema::build_retained(Some(visible)))),
        (PURPOSE, DataSource::Container(PurposeSchema::build_retained(purpose))),
        (PRIMVARS, DataSource::Container(primvars)),
        (MATERIAL_BINDINGS, DataSource::Container(bindings)),
    ])
}

fn prim(path: &str, ty: &str, data: Option<ContainerHandle>) -> AddedPrimEntry {
    AddedPrimEntry {
        prim_path: p(path),
        prim_type: ty.into(),
        data_source: data,
    }
}

/// Vegetables, fruit and furniture.
fn kitchen_scene() -> Rc<RetainedSceneIndex> {
    let scene = RetainedSceneIndex::new();
    scene.add_prims(&[
        prim("/A", "scope", None),
        prim("/A/B", "scope", None),
        prim("/A/C", "scope", None),
        prim(
            "/A/B/Carrot",
            "veg",
            Some(prim_data(true, "food", &["fresh"], &[("", "/Looks/OrangeMat")])),
        ),
        prim(
            "/A/B/Broccoli",
            "veg",
            Some(prim_data(
                true,
                "food",
                &[],
                &[("preview", "/Looks/GreenMat"), ("", "/Looks/WiltedGreenMat")],
            )),
        ),
        prim(
            "/A/B/Tomato",
            "fruit",
            Some(prim_data(
                true,
                "food",
                &["fresh", "foo:glossy"],
                &[("preview", "/Looks/GlossyRedMat")],
            )),
        ),
        prim(
            "/A/B/Apricot",
            "fruit",
            Some(prim_data(
                true,
                "food",
                &[],
                &[("preview", "/Looks/DriedOrangeMat"), ("", "/Looks/DriedOrangeMat")],
            )),
        ),
        prim("/A/C/Table", "mesh", Some(prim_data(true, "furniture", &[], &[]))),
        prim(
            "/A/C/Chair1",
            "mesh",
            Some(prim_data(
                true,
                "furniture",
                &["foo:glossy"],
                &[("preview", "/Looks/MetallicMat")],
            )),
        ),
        prim("/A/C/Chair2", "mesh", Some(prim_data(false, "furniture", &[], &[]))),
    ]);
    scene
}

fn evaluator(scene: &Rc<RetainedSceneIndex>, expr: &str) -> CollectionExpressionEvaluator {
    CollectionExpressionEvaluator::new(
        Some(scene.clone() as SceneIndexHandle),
        PathExpression::parse(expr).unwrap(),
    )
}

fn check(eval: &CollectionExpressionEvaluator, yes: &[&str], no: &[&str]) {
    for path in yes {
        assert!(eval.matches(&p(path)), "{} should match {}", eval.expression(), path);
    }
    for path in no {
        assert!(!eval.matches(&p(path)), "{} should not match {}", eval.expression(), path);
    }
}

#[test]
fn test_empty_evaluators() {
    let eval = CollectionExpressionEvaluator::new(None, PathExpression::default());
    assert!(eval.is_empty());
    assert!(!eval.matches(&p("/Foo")));

    let eval = CollectionExpressionEvaluator::new(None, PathExpression::parse("/Foo").unwrap());
    assert!(eval.is_empty());
    assert!(!eval.matches(&p("/Foo")));

    let scene = kitchen_scene();
    let eval = CollectionExpressionEvaluator::new(
        Some(scene as SceneIndexHandle),
        PathExpression::default(),
    );
    assert!(eval.is_empty());
    assert!(!eval.matches(&p("/A")));
}

#[test]
fn test_path_expressions() {
    let scene = RetainedSceneIndex::new();
    scene.add_prims(&[
        prim("/a/b/c/x/y/z/a/b/c", "foo", None),
        prim("/a/b/c/d/e/f/a/b/a/b/c", "scope", None),
    ]);

    check(
        &evaluator(&scene, "//b"),
        &[
            "/a/b",
            "/a/b/c/x/y/z/a/b",
            "/a/b/c/d/e/f/a/b",
            "/a/b/c/d/e/f/a/b/a/b",
            "/PrimDoesNotExist/b",
        ],
        &["/a/b/c", "/a/b/c/x/y/z/a/b/c"],
    );

    check(
        &evaluator(&scene, "//x//a//"),
        &[
            "/a/b/c/x/y/z/a",
            "/a/b/c/x/y/z/a/b",
            "/a/b/c/x/y/z/a/b/c",
            "/a/b/PrimDoesNotExist/x/y/z/a",
        ],
        &["/a/b/c/x", "/a/b/c/d/e/f/a"],
    );
}

#[test]
fn test_type_predicates() {
    let scene = kitchen_scene();
    check(
        &evaluator(&scene, "//{hdType:scope}"),
        &["/A", "/A/B", "/A/C"],
        &["/PrimDoesNotExist/C", "/A/B/Carrot"],
    );
    check(
        &evaluator(&scene, "//B/{type:fruit}"),
        &["/A/B/Tomato", "/A/B/Apricot"],
        &["/A/B/Carrot", "/A/C"],
    );
}

#[test]
fn test_data_source_predicates() {
    let scene = kitchen_scene();
    check(
        &evaluator(&scene, "//{hdHasDataSource:purpose}"),
        &["/A/B/Carrot", "/A/C/Table"],
        &["/A/B", "/A"],
    );
    check(
        &evaluator(&scene, r#"//{hdHasDataSource:"materialBindings."}"#),
        &["/A/B/Carrot", "/A/B/Broccoli", "/A/B/Apricot"],
        &["/A/B/Tomato", "/A/B", "/A/C/Chair1"],
    );
}

#[test]
fn test_primvar_predicates() {
    let scene = kitchen_scene();
    check(
        &evaluator(&scene, "//{hdHasPrimvar:fresh}"),
        &["/A/B/Carrot", "/A/B/Tomato"],
        &["/A/B/Broccoli", "/A"],
    );
    check(
        &evaluator(&scene, "//{hasPrimvar:'foo:glossy'}"),
        &["/A/B/Tomato", "/A/C/Chair1"],
        &["/A/B/Carrot"],
    );
}

#[test]
fn test_purpose_and_visibility_predicates() {
    let scene = kitchen_scene();
    check(
        &evaluator(&scene, "//{hdPurpose:food}"),
        &["/A/B/Carrot", "/A/B/Broccoli"],
        &["/A", "/A/C/Table"],
    );
    check(
        &evaluator(&scene, "//{hdPurpose:furniture}"),
        &["/A/C/Table", "/A/C/Chair2"],
        &["/A/B/Tomato", "/A/B/Apricot"],
    );
    for expr in ["//{hdVisible:true}", "//{hdVisible}"] {
        check(
            &evaluator(&scene, expr),
            &["/A/B/Carrot", "/A/C/Table", "/A/B/Broccoli"],
            &["/A", "/A/C/Chair2"],
        );
    }
}

#[test]
fn test_material_binding_predicate() {
    let scene = kitchen_scene();
    check(
        &evaluator(&scene, r#"//{hdHasMaterialBinding:"Orange"}"#),
        &["/A/B/Carrot", "/A/B/Apricot"],
        &["/A/B/Tomato", "/A/B", "/A/C/Chair1"],
    );
}

#[test]
fn test_custom_predicate_library() {
    let scene = kitchen_scene();
    let library = PredicateLibrary::standard().define(
        "eatable",
        |prim, args| {
            let wanted = args.bool_at(0).unwrap_or(true);
            let eatable = prim.prim_type == "veg" || prim.prim_type == "fruit";
            PredicateResult::varying(eatable == wanted)
        },
        [("isEatable", hydra_scene::util::Value::Bool(true))],
    );
    for expr in ["//{eatable:true}", "//{eatable}"] {
        let eval = CollectionExpressionEvaluator::with_library(
            Some(scene.clone() as SceneIndexHandle),
            PathExpression::parse(expr).unwrap(),
            library.clone(),
        );
        check(
            &eval,
            &["/A/B/Tomato", "/A/B/Apricot", "/A/B/Carrot"],
            &["/A/C", "/A/C/Chair"],
        );
    }

    let eval = CollectionExpressionEvaluator::with_library(
        Some(scene.clone() as SceneIndexHandle),
        PathExpression::parse("//{hdPurpose:furniture}").unwrap(),
        library,
    );
    check(&eval, &["/A/C/Table", "/A/C/Chair2"], &["/A/B/Tomato"]);
}

#[test]
fn test_populate_with_compound_predicates() {
    let scene = kitchen_scene();
    let root = ScenePath::absolute_root();
    assert_eq!(
        evaluator(&scene, "//{hdPurpose:food and hdHasPrimvar:fresh}").populate_all_matches(&root),
        vec![p("/A/B/Carrot"), p("/A/B/Tomato")]
    );
    assert_eq!(
        evaluator(&scene, "//{hdHasDataSource:visibility and hdVisible:false}")
            .populate_all_matches(&root),
        vec![p("/A/C/Chair2")]
    );
    assert_eq!(
        evaluator(&scene, "/A/C// - //{hdVisible:false}").populate_all_matches(&root),
        vec![p("/A/C"), p("/A/C/Chair1"), p("/A/C/Table")]
    );
}

#[test]
fn test_match_kinds() {
    let scene = RetainedSceneIndex::new();
    scene.add_prims(&[
        prim("/a/foobar/b", "scope", None),
        prim("/a/foobar/bar", "scope", None),
        prim("/a/foobar/baz", "scope", None),
    ]);
    let eval = evaluator(&scene, "//*bar");
    let root = ScenePath::absolute_root();

    assert_eq!(
        eval.populate_matches(&root, MatchKind::MatchAll),
        vec![p("/a/foobar"), p("/a/foobar/bar")]
    );
    assert_eq!(
        eval.populate_matches(&root, MatchKind::ShallowestMatches),
        vec![p("/a/foobar")]
    );
    assert_eq!(
        eval.populate_matches(&root, MatchKind::ShallowestMatchesAndAllDescendants),
        vec![
            p("/a/foobar"),
            p("/a/foobar/b"),
            p("/a/foobar/bar"),
            p("/a/foobar/baz"),
        ]
    );
}
