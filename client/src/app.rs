use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use hatvenn_shared::{ChunkId, Destination, OwnerTag, SLOT_COUNT};

use crate::api::{self, HttpWaitApi};
use crate::board::{ClueStage, SlotItem};
use crate::config::ClientConfig;
use crate::identity::{self, BrowserStore};
use crate::log;
use crate::session::{ClientSession, Screen, prepare_submission};
use crate::waiter::{self, BrowserTimer};

/// Newtype wrappers so each shared signal has a distinct context type.
#[derive(Clone, Copy)]
pub(crate) struct Session(pub RwSignal<ClientSession>);
#[derive(Clone, Copy)]
pub(crate) struct Config(pub StoredValue<ClientConfig>);
#[derive(Clone, Copy)]
pub(crate) struct DisplayName(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct DragOver(pub RwSignal<Option<Destination>>);

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

fn display(visible: bool, shown: &'static str) -> &'static str {
    if visible { shown } else { "none" }
}

#[component]
pub fn App(config: ClientConfig) -> impl IntoView {
    let session = RwSignal::new(ClientSession::new(
        OwnerTag::for_waiter(config.wid),
        config.initial_cursor,
    ));
    let display_name = RwSignal::new(identity::load_display_name(&BrowserStore));
    let drag_over: RwSignal<Option<Destination>> = RwSignal::new(None);
    let config = StoredValue::new(config);

    provide_context(Session(session));
    provide_context(Config(config));
    provide_context(DisplayName(display_name));
    provide_context(DragOver(drag_over));

    // Start the waiter on mount. It runs until the session expires or the page goes away.
    Effect::new(move || {
        let (wait_path, wid) = config.with_value(|c| (c.wait_path.clone(), c.wid));
        spawn_local(async move {
            let api = HttpWaitApi::new(wait_path, wid);
            let reason = waiter::run(&api, &BrowserTimer, &session).await;
            log::info(&format!("waiter finished: {reason:?}"));
        });
    });

    view! {
        <Notice />
        <CluePanel />
        <EntryForm />
        <VennBoard />
        <Chat />
    }
}

#[component]
fn Notice() -> impl IntoView {
    let Session(session) = expect_context();
    let notice = Memo::new(move |_| {
        session.with(|s| match s.screen() {
            Screen::Notice(text) => Some(text.clone()),
            _ => None,
        })
    });

    view! {
        <div
            id="message"
            style:display=move || display(notice.get().is_some(), "initial")
            inner_html=move || notice.get().unwrap_or_default()
        />
    }
}

#[component]
fn CluePanel() -> impl IntoView {
    let Session(session) = expect_context();
    let visible = Memo::new(move |_| session.with(|s| *s.screen() == Screen::Clue));
    let clue = Memo::new(move |_| session.with(|s| s.clue().clone()));

    view! {
        <div
            id="clue"
            style:display=move || display(visible.get(), "initial")
            inner_html=move || clue.get().text
        />
        <div id="clueanswer" style:display=move || display(visible.get(), "initial")>
            {move || clue.get().answer.unwrap_or_else(|| "\u{00a0}".to_string())}
        </div>
    }
}

fn submit_from(
    input: &web_sys::HtmlInputElement,
    display_name: RwSignal<String>,
    config: StoredValue<ClientConfig>,
) {
    let who = display_name.get_untracked();
    let Some(request) = prepare_submission(&input.value(), &who) else {
        return;
    };
    input.set_value("");
    identity::save_display_name(&BrowserStore, &who);

    let url = config.with_value(|c| c.submit_path.clone());
    spawn_local(async move {
        if let Err(message) = api::submit_answer(&url, &request).await {
            log::warn(&format!("submission rejected: {message}"));
            alert(&message);
        }
    });
}

#[component]
fn EntryForm() -> impl IntoView {
    let Session(session) = expect_context();
    let Config(config) = expect_context();
    let DisplayName(display_name) = expect_context();
    let visible = Memo::new(move |_| session.with(|s| *s.screen() == Screen::Clue));
    let text_ref = NodeRef::<leptos::html::Input>::new();

    let submit = move || {
        if let Some(input) = text_ref.get() {
            submit_from(&input, display_name, config);
        }
    };

    view! {
        <div id="entry" style:display=move || display(visible.get(), "flex")>
            <input
                id="who"
                type="text"
                placeholder="Your name"
                prop:value=move || display_name.get()
                on:input=move |e| display_name.set(event_target_value(&e))
            />
            <input
                id="text"
                type="text"
                node_ref=text_ref
                on:keydown=move |e: web_sys::KeyboardEvent| {
                    if e.key() == "Enter" {
                        e.prevent_default();
                        submit();
                    }
                }
            />
            <button
                id="hatsubmit"
                on:click=move |e| {
                    e.prevent_default();
                    submit();
                }
            >
                "Submit"
            </button>
        </div>
    }
}

fn set_opacity(e: &web_sys::DragEvent, opacity: &str) {
    if let Some(el) = e
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
    {
        el.style().set_property("opacity", opacity).ok();
    }
}

fn allow_drop(
    e: &web_sys::DragEvent,
    session: RwSignal<ClientSession>,
    drag_over: RwSignal<Option<Destination>>,
    destination: Destination,
) {
    // Only our own chunks can be dropped.
    if session.with_untracked(|s| s.pending_transfer().is_none()) {
        return;
    }
    e.prevent_default();
    if drag_over.get_untracked() != Some(destination) {
        drag_over.set(Some(destination));
    }
}

fn drop_on(
    e: &web_sys::DragEvent,
    session: RwSignal<ClientSession>,
    drag_over: RwSignal<Option<Destination>>,
    config: StoredValue<ClientConfig>,
    destination: Destination,
) {
    drag_over.set(None);
    let Some(request) = session
        .try_update(|s| s.complete_transfer(destination))
        .flatten()
    else {
        return;
    };
    e.prevent_default();

    let base = config.with_value(|c| c.place_path.clone());
    spawn_local(async move {
        match api::place_chunk(&base, &request).await {
            Ok(()) => session.update(|s| s.placement_acknowledged(&request)),
            Err(message) => {
                log::warn(&format!(
                    "placement of {} to {} rejected: {message}",
                    request.chunk, request.destination
                ));
                session.update(|s| s.placement_rejected(&request));
                alert(&message);
            }
        }
    });
}

#[component]
fn MineChunk(chunk: ChunkId) -> impl IntoView {
    let Session(session) = expect_context();
    let label = chunk.label().to_string();
    let id = chunk.dom_id();
    let pending = {
        let chunk = chunk.clone();
        Memo::new(move |_| {
            session.with(|s| s.board().pending_destination(&chunk).is_some())
        })
    };

    view! {
        <span
            class="chunk mine"
            class:pending=move || pending.get()
            id=id
            draggable="true"
            on:dragstart=move |e: web_sys::DragEvent| {
                set_opacity(&e, "0.4");
                if let Some(data) = e.data_transfer() {
                    data.set_data("text/plain", chunk.label()).ok();
                }
                session.update(|s| s.begin_transfer(chunk.clone()));
            }
            on:dragend=move |e: web_sys::DragEvent| {
                set_opacity(&e, "1");
                session.update(|s| s.cancel_transfer());
            }
        >
            {label}
        </span>
    }
}

fn slot_item_key(position: usize, item: &SlotItem) -> String {
    match item {
        SlotItem::Mine(chunk) => format!("mine:{chunk}"),
        SlotItem::Foreign(block) => format!("foreign:{position}:{}", block.chunk),
    }
}

fn render_slot_item(item: SlotItem) -> AnyView {
    match item {
        SlotItem::Mine(chunk) => view! { <MineChunk chunk=chunk /> }.into_any(),
        SlotItem::Foreign(block) => {
            let owners = block
                .owners
                .iter()
                .map(OwnerTag::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            view! {
                <span class="chunk notmine" title=owners>
                    {block.chunk.label().to_string()}
                </span>
            }
            .into_any()
        }
    }
}

#[component]
fn Slot(index: usize) -> impl IntoView {
    let Session(session) = expect_context();
    let Config(config) = expect_context();
    let DragOver(drag_over) = expect_context();
    let destination = Destination::Slot(index);

    let items = Memo::new(move |_| session.with(|s| s.board().view().slots[index].items.clone()));
    let solved = Memo::new(move |_| {
        session.with(|s| {
            s.board()
                .view()
                .solved
                .as_ref()
                .map(|words| words[index].clone())
        })
    });

    view! {
        <div
            class="target"
            id=format!("t{index}")
            class:drag-in=move || drag_over.get() == Some(destination)
            on:dragover=move |e: web_sys::DragEvent| allow_drop(&e, session, drag_over, destination)
            on:dragleave=move |_| drag_over.set(None)
            on:drop=move |e: web_sys::DragEvent| drop_on(&e, session, drag_over, config, destination)
        >
            {move || match solved.get() {
                Some(word) => word.into_any(),
                None => view! {
                    <For
                        each={move || items.get().into_iter().enumerate().collect::<Vec<_>>()}
                        key=|(position, item)| slot_item_key(*position, item)
                        children=move |(_, item)| render_slot_item(item)
                    />
                }
                .into_any(),
            }}
        </div>
    }
}

#[component]
fn Bank() -> impl IntoView {
    let Session(session) = expect_context();
    let Config(config) = expect_context();
    let DragOver(drag_over) = expect_context();
    let destination = Destination::Bank;

    let bank = Memo::new(move |_| session.with(|s| s.board().view().bank.clone()));
    let waiting_for_chunks = Memo::new(move |_| {
        session.with(|s| {
            !s.board().is_bootstrapped() && s.board().stage().accepts_snapshots()
        })
    });

    view! {
        <div
            id="bank"
            class:drag-in=move || drag_over.get() == Some(destination)
            on:dragover=move |e: web_sys::DragEvent| allow_drop(&e, session, drag_over, destination)
            on:dragleave=move |_| drag_over.set(None)
            on:drop=move |e: web_sys::DragEvent| drop_on(&e, session, drag_over, config, destination)
        >
            <For
                each=move || bank.get()
                key=|chunk| chunk.clone()
                children=move |chunk| view! { <MineChunk chunk=chunk /> }
            />
            {move || waiting_for_chunks.get().then(|| view! {
                <span class="bank-waiting">"Waiting for chunks\u{2026}"</span>
            })}
        </div>
    }
}

#[component]
fn CenterEntry() -> impl IntoView {
    let Session(session) = expect_context();
    let Config(config) = expect_context();
    let DisplayName(display_name) = expect_context();
    let stage = Memo::new(move |_| session.with(|s| s.board().stage()));
    let center_answer =
        Memo::new(move |_| session.with(|s| s.board().view().center_answer.clone()));
    let input_ref = NodeRef::<leptos::html::Input>::new();

    Effect::new(move || {
        if stage.get() == ClueStage::VennComplete
            && let Some(input) = input_ref.get()
        {
            input.focus().ok();
        }
    });

    view! {
        <input
            id="t6e"
            type="text"
            node_ref=input_ref
            style:display=move || display(stage.get() == ClueStage::VennComplete, "initial")
            on:keydown=move |e: web_sys::KeyboardEvent| {
                if e.key() == "Enter" {
                    e.prevent_default();
                    if let Some(input) = input_ref.get() {
                        submit_from(&input, display_name, config);
                    }
                }
            }
        />
        <div
            id="t6a"
            style:display=move || display(stage.get() == ClueStage::CenterComplete, "initial")
        >
            {move || center_answer.get().unwrap_or_default()}
        </div>
    }
}

#[component]
fn VennBoard() -> impl IntoView {
    let Session(session) = expect_context();
    let visible = Memo::new(move |_| session.with(|s| *s.screen() == Screen::Venn));
    let words = Memo::new(move |_| session.with(|s| s.board().view().words.clone()));

    view! {
        <div id="venn" style:display=move || display(visible.get(), "initial")>
            <div id="words">
                {move || {
                    words
                        .get()
                        .into_iter()
                        .map(|word| view! { <div>{word}</div> })
                        .collect_view()
                }}
            </div>
            <div id="targets">
                {(0..SLOT_COUNT).map(|index| view! { <Slot index=index /> }).collect_view()}
            </div>
            <CenterEntry />
            <Bank />
        </div>
    }
}

#[component]
fn Chat() -> impl IntoView {
    let Session(session) = expect_context();
    let lines = Memo::new(move |_| {
        session.with(|s| s.chat().lines().map(str::to_string).collect::<Vec<_>>())
    });

    view! {
        <div id="chat">
            {move || {
                lines
                    .get()
                    .into_iter()
                    .map(|line| view! { <p inner_html=line /> })
                    .collect_view()
            }}
        </div>
    }
}
