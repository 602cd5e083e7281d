use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use serde_json::json;
use web_sys::{window, Element, MouseEvent, ScrollBehavior, ScrollIntoViewOptions};
use yew::prelude::*;

use crate::bridges;
use crate::content::{
    Card, ABOUT, CERTIFICATIONS, CONTACT, EDUCATION, EXPERIENCE, IDENTITY, PROJECTS, RESUME_PATH,
    SKILLS, SOCIAL_LINKS,
};
use crate::layout::HeaderLayout;
use crate::nav::{NavItemStatus, NavItemVisual};
use crate::sections::{SectionId, SectionTop};
use crate::telemetry::{self, log_event, LogLevel};
use crate::tracker::{ActiveSectionState, ActiveSectionTracker};
use crate::viewport::{read_viewport, ViewportMetrics};
use crate::widgets::PRELOADER_CONTAINER_ID;

fn now() -> f64 {
    js_sys::Date::now()
}

#[derive(Clone, PartialEq)]
struct SectionRegistry {
    refs: [(SectionId, NodeRef); 4],
}

impl SectionRegistry {
    fn element(&self, id: SectionId) -> Option<Element> {
        self.refs
            .iter()
            .find(|(section, _)| *section == id)
            .and_then(|(_, node)| node.cast::<Element>())
    }

    fn node_ref(&self, id: SectionId) -> NodeRef {
        self.refs
            .iter()
            .find(|(section, _)| *section == id)
            .map(|(_, node)| node.clone())
            .unwrap_or_default()
    }

    fn measure(&self) -> Vec<SectionTop> {
        self.refs
            .iter()
            .map(|(id, node)| match node.cast::<Element>() {
                Some(element) => SectionTop::mounted(*id, element.get_bounding_client_rect().top()),
                None => SectionTop::unmounted(*id),
            })
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq)]
struct NavSnapshot {
    state: ActiveSectionState,
    programmatic: bool,
}

impl NavSnapshot {
    fn of(tracker: &ActiveSectionTracker) -> Self {
        Self {
            state: *tracker.state(),
            programmatic: tracker.is_programmatic(),
        }
    }

    fn status(&self, id: SectionId, hovered: Option<SectionId>) -> NavItemStatus {
        let active = self.state.current == id;
        NavItemStatus {
            active,
            hovered: hovered == Some(id) && !active,
            just_activated: self.state.just_activated(id),
            programmatic: self.programmatic,
        }
    }
}

/// Everything a scroll tick or timer needs. Timer handles are held weakly so
/// a pending callback never keeps the page's timers alive after unmount.
#[derive(Clone)]
struct PageSync {
    tracker: Rc<RefCell<ActiveSectionTracker>>,
    nav: UseStateHandle<NavSnapshot>,
    viewport: UseStateHandle<ViewportMetrics>,
    sections: SectionRegistry,
    settle_timer: Weak<RefCell<Option<Timeout>>>,
}

impl PageSync {
    fn publish(&self) {
        self.nav.set(NavSnapshot::of(&self.tracker.borrow()));
    }

    fn tick(&self) {
        let metrics = read_viewport();
        self.viewport.set(metrics);

        let changed = self
            .tracker
            .borrow_mut()
            .observe(&metrics.scroll_state(), &self.sections.measure(), now());

        if let Some(section) = changed {
            log_event(
                LogLevel::Debug,
                "section.activated",
                json!({ "section": section, "scroll_y": metrics.scroll_y }),
            );
            self.publish();
            self.schedule_settle();
        }
    }

    /// Arms the timer that lets `previous` catch up with `current`. Called
    /// after every change of the active section, whatever caused it.
    fn schedule_settle(&self) {
        let Some(delay) = self.tracker.borrow().settle_due_in(now()) else {
            return;
        };
        let Some(slot) = self.settle_timer.upgrade() else {
            return;
        };

        let sync = self.clone();
        let timeout = Timeout::new(delay, move || {
            let settled = sync.tracker.borrow_mut().settle(now());
            if settled {
                sync.publish();
            } else {
                // fired before the clock agreed the window had passed
                sync.schedule_settle();
            }
        });
        *slot.borrow_mut() = Some(timeout);
    }
}

#[derive(Properties, PartialEq)]
struct ExternalLinkProps {
    href: AttrValue,
    label: AttrValue,
    #[prop_or_default]
    class: Classes,
    #[prop_or(true)]
    new_tab: bool,
}

#[function_component(ExternalLink)]
fn external_link(props: &ExternalLinkProps) -> Html {
    html! {
        <a
            class={classes!("link", props.class.clone())}
            href={props.href.clone()}
            target={props.new_tab.then_some("_blank")}
            rel={props.new_tab.then_some("noopener noreferrer")}
        >
            {props.label.clone()}
            if props.new_tab {
                <span class="sr-only">{" (opens in a new tab)"}</span>
            }
        </a>
    }
}

#[function_component(SocialAndResume)]
fn social_and_resume() -> Html {
    html! {
        <div class="social-row">
            <div class="social-links">
                { for SOCIAL_LINKS.iter().map(|link| html! {
                    <ExternalLink
                        href={link.href}
                        label={link.label}
                        new_tab={link.external}
                    />
                }) }
            </div>
            <ExternalLink href={RESUME_PATH} label="Resume" class="resume-button" />
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct NavItemProps {
    section: SectionId,
    status: NavItemStatus,
    on_select: Callback<SectionId>,
    on_hover: Callback<Option<SectionId>>,
}

#[function_component(NavItem)]
fn nav_item(props: &NavItemProps) -> Html {
    let visual = NavItemVisual::for_status(props.status);
    let section = props.section;

    let onclick = {
        let on_select = props.on_select.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(section))
    };
    let onmouseenter = {
        let on_hover = props.on_hover.clone();
        Callback::from(move |_: MouseEvent| on_hover.emit(Some(section)))
    };
    let onmouseleave = {
        let on_hover = props.on_hover.clone();
        Callback::from(move |_: MouseEvent| on_hover.emit(None))
    };

    html! {
        <div class="nav-entry">
            <button
                type="button"
                class={visual.class()}
                aria-current={props.status.active.then_some("true")}
                onclick={onclick}
                onmouseenter={onmouseenter}
                onmouseleave={onmouseleave}
            >
                <span class="nav-underline" style={visual.underline_style()}></span>
                <span class="nav-label" style={visual.label_style()}>{section.label()}</span>
            </button>
        </div>
    }
}

fn nav_items(
    nav: &NavSnapshot,
    hovered: Option<SectionId>,
    on_select: &Callback<SectionId>,
    on_hover: &Callback<Option<SectionId>>,
) -> Html {
    html! {
        <nav class="nav-list" aria-label="Sections">
            { for SectionId::ALL.iter().map(|id| html! {
                <NavItem
                    key={id.dom_id()}
                    section={*id}
                    status={nav.status(*id, hovered)}
                    on_select={on_select.clone()}
                    on_hover={on_hover.clone()}
                />
            }) }
        </nav>
    }
}

#[derive(Properties, PartialEq)]
struct PreloaderProps {
    on_finish: Callback<()>,
}

#[function_component(Preloader)]
fn preloader(props: &PreloaderProps) -> Html {
    {
        let on_finish = props.on_finish.clone();
        use_effect_with((), move |_| {
            let handle = {
                let on_finish = on_finish.clone();
                bridges::start_preloader(move || on_finish.emit(()))
            };
            let handle = match handle {
                Ok(handle) => handle,
                Err(error) => {
                    log_event(LogLevel::Warn, "preloader.unavailable", json!({ "error": error.to_string() }));
                    on_finish.emit(());
                    None
                }
            };
            move || drop(handle)
        });
    }

    html! {
        <div id="preloader" class="preloader">
            <div id={PRELOADER_CONTAINER_ID} class="preloader-container"></div>
        </div>
    }
}

#[function_component(ShaderBackground)]
fn shader_background() -> Html {
    let host = use_node_ref();

    {
        let host = host.clone();
        use_effect_with((), move |_| {
            let handle = host
                .cast::<Element>()
                .and_then(|element| match bridges::start_shader_background(&element) {
                    Ok(handle) => handle,
                    Err(error) => {
                        log_event(LogLevel::Warn, "shader.unavailable", json!({ "error": error.to_string() }));
                        None
                    }
                });
            move || drop(handle)
        });
    }

    html! { <div ref={host} class="shader-background" aria-hidden="true"></div> }
}

fn render_cards(cards: &[Card]) -> Html {
    html! {
        { for cards.iter().map(|card| html! {
            <article class="card">
                <h3>{card.title}</h3>
                if let Some(period) = card.period {
                    <p class="card-period">{period}</p>
                }
                <p>{card.body}</p>
            </article>
        }) }
    }
}

fn render_section(id: SectionId, node: NodeRef, body: Html) -> Html {
    html! {
        <section ref={node} id={id.dom_id()} class="content-section">
            <div class="section-panel">
                <h2>{id.label()}</h2>
                {body}
            </div>
        </section>
    }
}

fn render_header(layout: &HeaderLayout, scrolled: bool) -> Html {
    if scrolled {
        html! {
            <div class="header-copy header-copy--scrolled">
                <h1>{IDENTITY.name}</h1>
                <h2 class="header-role">{IDENTITY.role}</h2>
                <p class="header-location">{IDENTITY.location}</p>
                if layout.show_description {
                    <p class="header-bio">{IDENTITY.bio}</p>
                }
            </div>
        }
    } else {
        html! {
            <div class="header-copy">
                <h1 class={classes!("hero-title", layout.pixelate_title.then_some("is-pixelating"))}>
                    {format!("Hi, I'm {} ", IDENTITY.name)}
                    <span class="wave" aria-hidden="true">{"👋"}</span>
                </h1>
                <p class="header-bio">{IDENTITY.bio}</p>
                <SocialAndResume />
            </div>
        }
    }
}

#[function_component(App)]
fn app() -> Html {
    let preloading = use_state(|| true);
    let menu_open = use_state(|| false);
    let hovered = use_state(|| None::<SectionId>);
    let viewport = use_state_eq(read_viewport);
    let tracker = use_mut_ref(|| ActiveSectionTracker::new(now()));
    let nav = {
        let tracker = tracker.clone();
        use_state_eq(move || NavSnapshot::of(&tracker.borrow()))
    };
    let settle_timer = use_mut_ref(|| None::<Timeout>);
    let scroll_timers = use_mut_ref(Vec::<Timeout>::new);

    let about_ref = use_node_ref();
    let experience_ref = use_node_ref();
    let education_ref = use_node_ref();
    let projects_ref = use_node_ref();

    let sections = SectionRegistry {
        refs: [
            (SectionId::About, about_ref),
            (SectionId::Experience, experience_ref),
            (SectionId::Education, education_ref),
            (SectionId::Projects, projects_ref),
        ],
    };

    let sync = PageSync {
        tracker: tracker.clone(),
        nav: nav.clone(),
        viewport: viewport.clone(),
        sections: sections.clone(),
        settle_timer: Rc::downgrade(&settle_timer),
    };

    {
        let sync = sync.clone();
        use_effect_with((), move |_| {
            sync.tick();
            sync.schedule_settle();

            let listeners = window().map(|win| {
                let on_scroll = {
                    let sync = sync.clone();
                    EventListener::new(&win, "scroll", move |_| sync.tick())
                };
                let on_resize = {
                    let sync = sync.clone();
                    EventListener::new(&win, "resize", move |_| sync.tick())
                };
                [on_scroll, on_resize]
            });

            move || drop(listeners)
        });
    }

    let on_select = {
        let sync = sync.clone();
        let menu_open = menu_open.clone();
        let scroll_timers = scroll_timers.clone();
        Callback::from(move |target: SectionId| {
            let request = sync
                .tracker
                .borrow_mut()
                .request_scroll(target, *menu_open, now());
            sync.publish();
            sync.schedule_settle();
            log_event(
                LogLevel::Info,
                "scroll.programmatic.start",
                json!({ "section": target, "generation": request.generation }),
            );

            if request.close_overlay {
                menu_open.set(false);
            }

            let scroll = {
                let sections = sync.sections.clone();
                Timeout::new(request.scroll_delay_ms, move || {
                    if let Some(element) = sections.element(target) {
                        let options = ScrollIntoViewOptions::new();
                        options.set_behavior(ScrollBehavior::Smooth);
                        element.scroll_into_view_with_scroll_into_view_options(&options);
                    }
                })
            };

            let release = {
                let sync = sync.clone();
                Timeout::new(request.release_after_ms(), move || {
                    let released = sync.tracker.borrow_mut().release(request.generation);
                    if released {
                        log_event(
                            LogLevel::Debug,
                            "scroll.programmatic.release",
                            json!({ "generation": request.generation }),
                        );
                        sync.publish();
                        sync.tick();
                    }
                })
            };

            *scroll_timers.borrow_mut() = vec![scroll, release];
        })
    };

    let on_hover = {
        let hovered = hovered.clone();
        Callback::from(move |section: Option<SectionId>| hovered.set(section))
    };

    let on_toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(!*menu_open))
    };

    let on_preloader_finish = {
        let preloading = preloading.clone();
        Callback::from(move |_| preloading.set(false))
    };

    let flags = viewport.flags();
    let layout = HeaderLayout::from_viewport(&viewport);

    use_effect_with(layout.mode, |mode| {
        log_event(LogLevel::Debug, "layout.mode", json!({ "mode": mode }));
        || ()
    });

    html! {
        <>
            if *preloading {
                <Preloader on_finish={on_preloader_finish} />
            }
            <main class="page-shell">
                <ShaderBackground />

                if flags.mobile {
                    <>
                        <button
                            class="menu-toggle"
                            type="button"
                            aria-label={if *menu_open { "Close menu" } else { "Open menu" }}
                            aria-expanded={(*menu_open).to_string()}
                            onclick={on_toggle_menu}
                        >
                            <span aria-hidden="true">{if *menu_open { "✕" } else { "☰" }}</span>
                        </button>
                        if *menu_open {
                            <div class="mobile-menu">
                                {nav_items(&nav, *hovered, &on_select, &on_hover)}
                                <SocialAndResume />
                            </div>
                        }
                    </>
                }

                <div class="hero">
                    <div class={layout.class()} style={layout.style()}>
                        {render_header(&layout, flags.scrolled)}
                    </div>

                    if layout.show_model {
                        <div class="model-slot" aria-hidden="true"></div>
                    }

                    if !flags.mobile {
                        <div class={classes!("nav-rail", layout.show_nav_rail.then_some("is-visible"))}>
                            {nav_items(&nav, *hovered, &on_select, &on_hover)}
                            <SocialAndResume />
                        </div>
                    }
                </div>

                {render_section(SectionId::About, sections.node_ref(SectionId::About), render_cards(&ABOUT))}
                {render_section(SectionId::Experience, sections.node_ref(SectionId::Experience), html! {
                    <>
                        {render_cards(&EXPERIENCE)}
                        <article class="card">
                            <h3>{"Skills"}</h3>
                            <ul class="skill-list">
                                { for SKILLS.iter().map(|skill| html! { <li key={*skill}>{*skill}</li> }) }
                            </ul>
                        </article>
                    </>
                })}
                {render_section(SectionId::Education, sections.node_ref(SectionId::Education), html! {
                    <>
                        {render_cards(&EDUCATION)}
                        <article class="card">
                            <h3>{"Certifications & Achievements"}</h3>
                            <ul class="bullet-list">
                                { for CERTIFICATIONS.iter().map(|item| html! { <li key={*item}>{*item}</li> }) }
                            </ul>
                        </article>
                    </>
                })}
                {render_section(SectionId::Projects, sections.node_ref(SectionId::Projects), html! {
                    <>
                        {render_cards(&PROJECTS)}
                        <article class="card">
                            <h3>{CONTACT.title}</h3>
                            <p>{CONTACT.body}</p>
                            <div class="contact-actions">
                                <ExternalLink href={RESUME_PATH} label="Download Resume" class="button-solid" />
                                <ExternalLink
                                    href={SOCIAL_LINKS[2].href}
                                    label="Send Message"
                                    class="button-outline"
                                    new_tab={false}
                                />
                            </div>
                        </article>
                    </>
                })}
            </main>
        </>
    }
}

pub fn run() {
    telemetry::init_from_storage();
    log_event(LogLevel::Debug, "page.boot", json!({ "sections": SectionId::ALL.len() }));

    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
