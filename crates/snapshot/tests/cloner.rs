use core::cell::Cell;
use core::time::Duration;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use dom::{
    Bounds, Document, DocumentHandle, ElementRef, FontFace, Frame, FrameOptions, Freeze,
    ImageState, NodeId,
};
use futures::future::ready;
use snapshot::cloner::{
    CONTAINER_CLASS, FORCE_CLONE_ATTRIBUTE, IGNORE_ATTRIBUTE, IgnorePredicate, OnClone,
};
use snapshot::{
    CloneError, CloneOptions, Context, ContextOptions, DocumentCloner, Options, SnapshotError,
    clone_document, render_element,
};
use tokio::time::{sleep, timeout};

const WEBKIT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 (KHTML, like Gecko)";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn context() -> Rc<Context> {
    Rc::new(Context::new(&ContextOptions::default(), Bounds::new(0.0, 0.0, 800.0, 600.0)))
}

fn by_id(frame: &Frame, id: &str) -> Result<NodeId> {
    let document = frame.document();
    let found = document.borrow().get_element_by_id(id);
    found.ok_or_else(|| anyhow!("missing #{id}"))
}

/// Tag names (or `#text`) of the clone's reference children.
fn cloned_child_names(cloner: &DocumentCloner) -> Result<Vec<String>> {
    let reference = cloner
        .cloned_reference()
        .ok_or_else(|| anyhow!("reference was not cloned"))?;
    let document = cloner.cloned_document();
    Ok(document
        .children(reference)
        .into_iter()
        .map(|child| {
            document
                .element(child)
                .map_or_else(|| document.node_name(child), |data| data.tag.clone())
        })
        .collect())
}

fn clone_target(markup: &str, options: CloneOptions) -> Result<DocumentCloner> {
    let frame = Frame::load_html(markup, &FrameOptions::default());
    let target = by_id(&frame, "target")?;
    Ok(DocumentCloner::new(context(), &frame.document(), target, options)?)
}

#[test]
fn children_keep_document_order() -> Result<()> {
    init_logging();
    let cloner = clone_target(
        r#"<body><div id="target"><h1>t</h1><p>one</p><!--note--><em>two</em></div></body>"#,
        CloneOptions::default(),
    )?;
    assert_eq!(cloned_child_names(&cloner)?, ["h1", "p", "#comment", "em"]);
    Ok(())
}

#[test]
fn scripts_and_ignored_elements_are_dropped_unless_forced() -> Result<()> {
    init_logging();
    let markup = format!(
        r#"<body><div id="target">
<script>one()</script>
<script {FORCE_CLONE_ATTRIBUTE}>two()</script>
<aside {IGNORE_ATTRIBUTE}></aside>
<nav class="skip"></nav>
<nav class="skip" {FORCE_CLONE_ATTRIBUTE}></nav>
<style>p {{ color: red }}</style>
</div></body>"#
    );
    let skip: IgnorePredicate = Rc::new(|element: ElementRef<'_>| element.has_class("skip"));
    let options = CloneOptions {
        ignore_elements: Some(skip),
        ..CloneOptions::default()
    };
    let cloner = clone_target(&markup, options.clone())?;
    let elements: Vec<String> = cloned_child_names(&cloner)?
        .into_iter()
        .filter(|name| name != "#text")
        .collect();
    assert_eq!(elements, ["script", "nav", "style"]);

    let without_styles = clone_target(
        &markup,
        CloneOptions {
            copy_styles: false,
            ..options
        },
    )?;
    let names = cloned_child_names(&without_styles)?;
    assert!(!names.iter().any(|name| name == "style"));
    Ok(())
}

#[test]
fn video_children_are_not_cloned() -> Result<()> {
    init_logging();
    let cloner = clone_target(
        r#"<body><div id="target"><video id="clip"><source src="a.webm"><track src="a.vtt"></video></div></body>"#,
        CloneOptions::default(),
    )?;
    let reference = cloner
        .cloned_reference()
        .ok_or_else(|| anyhow!("reference was not cloned"))?;
    let document = cloner.cloned_document();
    let video = document.element_children(reference)[0];
    assert!(document.is_element(video, "video"));
    assert!(document.children(video).is_empty());
    Ok(())
}

#[test]
fn paintable_clones_are_frozen_and_shadow_roots_flattened() -> Result<()> {
    init_logging();
    let cloner = clone_target(
        r#"<body><div id="target"><card-view><template shadowrootmode="open"><header><slot name="title"></slot></header><slot>empty</slot></template><b slot="title">Title</b></card-view></div></body>"#,
        CloneOptions::default(),
    )?;
    let reference = cloner
        .cloned_reference()
        .ok_or_else(|| anyhow!("reference was not cloned"))?;
    let document = cloner.cloned_document();
    let host = document.element_children(reference)[0];
    let host_data = document
        .element(host)
        .ok_or_else(|| anyhow!("host is not an element"))?;
    assert_eq!(host_data.freeze, Freeze::ALL);
    assert!(host_data.shadow_root.is_none());

    let children = document.children(host);
    assert_eq!(children.len(), 2);
    assert!(document.is_element(children[0], "header"));
    assert_eq!(document.text_content(children[0]), "Title");
    assert_eq!(document.text(children[1]), Some("empty"));
    Ok(())
}

#[tokio::test]
async fn sandbox_holds_clone_and_is_removed() -> Result<()> {
    init_logging();
    let frame = Frame::load_html(
        r#"<!DOCTYPE html><body><div id="target"><p>content</p></div></body>"#,
        &FrameOptions::default(),
    );
    let target = by_id(&frame, "target")?;
    let sandbox = clone_document(context(), &frame, target, CloneOptions::default()).await?;

    {
        let owner = frame.document();
        let owner = owner.borrow();
        let container = sandbox.container();
        assert!(owner.is_connected(container));
        assert_eq!(owner.attr(container, "class"), Some(CONTAINER_CLASS));
        assert_eq!(owner.attr(container, IGNORE_ATTRIBUTE), Some("true"));
        assert_eq!(owner.attr(container, "scrolling"), Some("no"));
        assert_eq!(owner.attr(container, "width"), Some("800"));
    }
    {
        let cloned = sandbox.document();
        let cloned = cloned.borrow();
        assert_eq!(cloned.doctype().map(|doctype| doctype.name.as_str()), Some("html"));
        assert!(cloned.is_element(sandbox.reference(), "div"));
        assert_eq!(cloned.text_content(sandbox.reference()), "content");
        assert!(cloned.elements_by_tag_name("iframe").is_empty());
    }

    let container = sandbox.container();
    sandbox.remove();
    let owner = frame.document();
    assert!(owner.borrow().node(container).is_none());
    assert!(frame.content_frame(container).is_none());
    Ok(())
}

#[tokio::test]
async fn hook_mutations_are_visible_downstream() -> Result<()> {
    init_logging();
    let frame = Frame::load_html(
        r#"<body><div id="target"><p>before</p></div></body>"#,
        &FrameOptions::default(),
    );
    let target = by_id(&frame, "target")?;
    let hook = |document: DocumentHandle, reference: NodeId| {
        document.borrow_mut().set_attr(reference, "data-touched", "yes");
        ready(anyhow::Ok(()))
    };
    let on_clone: Rc<dyn OnClone> = Rc::new(hook);
    let options = CloneOptions {
        on_clone: Some(on_clone),
        ..CloneOptions::default()
    };
    let sandbox = clone_document(context(), &frame, target, options).await?;

    let cloned = sandbox.document();
    assert_eq!(cloned.borrow().attr(sandbox.reference(), "data-touched"), Some("yes"));
    let live = frame.document();
    assert_eq!(live.borrow().attr(target, "data-touched"), None);
    Ok(())
}

#[tokio::test]
async fn hook_error_aborts_and_removes_container() -> Result<()> {
    init_logging();
    let frame = Frame::load_html(
        r#"<body><div id="target">x</div></body>"#,
        &FrameOptions::default(),
    );
    let target = by_id(&frame, "target")?;
    let hook = |_: DocumentHandle, _: NodeId| ready(Err::<(), _>(anyhow!("hook refused")));
    let on_clone: Rc<dyn OnClone> = Rc::new(hook);
    let options = CloneOptions {
        on_clone: Some(on_clone),
        ..CloneOptions::default()
    };
    let Err(err) = clone_document(context(), &frame, target, options).await else {
        return Err(anyhow!("hook error was swallowed"));
    };
    assert_eq!(err.to_string(), "hook refused");
    assert!(frame.document().borrow().elements_by_tag_name("iframe").is_empty());
    Ok(())
}

#[tokio::test]
async fn excluded_reference_is_not_found() -> Result<()> {
    init_logging();
    let frame = Frame::load_html(
        &format!(r#"<body><p>keep</p><div id="target" {IGNORE_ATTRIBUTE}>gone</div></body>"#),
        &FrameOptions::default(),
    );
    let target = by_id(&frame, "target")?;
    let Err(err) = clone_document(context(), &frame, target, CloneOptions::default()).await else {
        return Err(anyhow!("ignored reference was located"));
    };
    assert_eq!(
        err.downcast_ref::<CloneError>(),
        Some(&CloneError::ReferenceNotFound {
            node_name: "DIV".to_owned()
        })
    );
    assert_eq!(
        err.to_string(),
        "Error finding the DIV in the cloned document"
    );
    assert!(frame.document().borrow().elements_by_tag_name("iframe").is_empty());
    Ok(())
}

#[tokio::test]
async fn owner_without_body_has_no_sandbox_window() -> Result<()> {
    init_logging();
    let mut document = Document::new();
    let html = document.create_element("html");
    let target = document.create_element("div");
    document.append_child(document.root(), html)?;
    document.append_child(html, target)?;
    let frame = Frame::new(document, &FrameOptions::default());

    let Err(err) = clone_document(context(), &frame, target, CloneOptions::default()).await else {
        return Err(anyhow!("sandbox created without a body"));
    };
    assert_eq!(
        err.downcast_ref::<CloneError>(),
        Some(&CloneError::SandboxWindowUnavailable)
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn readiness_waits_for_late_images_and_fonts() -> Result<()> {
    init_logging();
    let options = FrameOptions {
        user_agent: WEBKIT_USER_AGENT.to_owned(),
        ..FrameOptions::default()
    };
    let frame = Frame::load_html(
        r#"<body><div id="target"><img src="hero.png"><p>text</p></div></body>"#,
        &options,
    );
    let target = by_id(&frame, "target")?;
    let face = Rc::new(FontFace::new("Inter"));
    let image = {
        let document = frame.document();
        let mut document = document.borrow_mut();
        document.add_font_face(Rc::clone(&face));
        document
            .image_request("hero.png")
            .ok_or_else(|| anyhow!("image was not requested"))?
    };

    let settled_at_hook = Rc::new(Cell::new(false));
    let observed = Rc::clone(&settled_at_hook);
    let hook = move |document: DocumentHandle, _: NodeId| {
        let settled = document.borrow().fonts().is_ready()
            && document
                .borrow()
                .images()
                .iter()
                .all(|(_, request)| request.as_ref().is_some_and(|request| request.is_settled()));
        observed.set(settled);
        ready(anyhow::Ok(()))
    };
    let on_clone: Rc<dyn OnClone> = Rc::new(hook);
    let clone_options = CloneOptions {
        on_clone: Some(on_clone),
        ..CloneOptions::default()
    };

    let loader = async {
        sleep(Duration::from_millis(300)).await;
        face.set_loaded();
        sleep(Duration::from_millis(300)).await;
        image.fail();
    };
    let (sandbox, ()) = tokio::join!(
        clone_document(context(), &frame, target, clone_options),
        loader
    );
    let sandbox = sandbox?;

    assert!(settled_at_hook.get());
    assert_eq!(image.state(), ImageState::Broken);
    sandbox.remove();
    Ok(())
}

#[tokio::test]
async fn render_element_requires_a_window() -> Result<()> {
    init_logging();
    let mut document = Document::new();
    let html = document.create_element("html");
    document.append_child(document.root(), html)?;
    let handle = document.into_handle();

    let Err(err) = render_element(&handle, html, Options::default()).await else {
        return Err(anyhow!("rendered without a window"));
    };
    assert_eq!(
        err.downcast_ref::<SnapshotError>(),
        Some(&SnapshotError::NoDefaultView)
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn abandoned_clone_removes_its_container() -> Result<()> {
    init_logging();
    let frame = Frame::load_html(
        r#"<body><div id="target"><img src="slow.png"></div></body>"#,
        &FrameOptions::default(),
    );
    let target = by_id(&frame, "target")?;
    let options = CloneOptions {
        wait_for_images: Some(true),
        ..CloneOptions::default()
    };
    let pending = clone_document(context(), &frame, target, options);
    let attached_while_waiting = async {
        sleep(Duration::from_millis(500)).await;
        let owner = frame.document();
        let count = owner.borrow().elements_by_tag_name("iframe").len();
        count
    };
    let (outcome, attached) = tokio::join!(
        timeout(Duration::from_secs(1), pending),
        attached_while_waiting
    );

    let Err(_elapsed) = outcome else {
        return Err(anyhow!("clone finished although the image never settled"));
    };
    assert_eq!(attached, 1);
    let owner = frame.document();
    assert!(owner.borrow().elements_by_tag_name("iframe").is_empty());
    Ok(())
}

#[tokio::test]
async fn sandbox_is_scrolled_before_the_hook_runs() -> Result<()> {
    init_logging();
    let frame = Frame::load_html(
        r#"<body><div id="target"><p>tall</p></div></body>"#,
        &FrameOptions::default(),
    );
    let target = by_id(&frame, "target")?;
    let seen = Rc::new(Cell::new(None));
    let observed = Rc::clone(&seen);
    let hook = move |document: DocumentHandle, _: NodeId| {
        let view = document.borrow().default_view();
        observed.set(view.map(|view| (view.scroll_x(), view.scroll_y())));
        ready(anyhow::Ok(()))
    };
    let on_clone: Rc<dyn OnClone> = Rc::new(hook);
    let options = CloneOptions {
        on_clone: Some(on_clone),
        ..CloneOptions::default()
    };
    let window = Bounds::new(40.0, 250.0, 800.0, 600.0);
    let context = Rc::new(Context::new(&ContextOptions::default(), window));
    let sandbox = clone_document(context, &frame, target, options).await?;

    assert_eq!(seen.get(), Some((40.0, 250.0)));
    assert_eq!(
        (sandbox.frame().scroll_x(), sandbox.frame().scroll_y()),
        (40.0, 250.0)
    );
    sandbox.remove();
    Ok(())
}

#[test]
fn document_without_root_element_cannot_be_cloned() -> Result<()> {
    init_logging();
    let mut document = Document::new();
    let note = document.create_comment("no markup yet");
    document.append_child(document.root(), note)?;
    let handle = document.into_handle();

    let cloned = DocumentCloner::new(context(), &handle, note, CloneOptions::default());
    assert!(matches!(cloned, Err(CloneError::MissingDocumentElement)));
    Ok(())
}
