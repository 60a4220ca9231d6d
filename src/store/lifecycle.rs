//! Engine initialization and teardown.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use super::{EngineOf, ViewerSnapshot, ViewerStore};
use crate::engine::{EngineFactory, SceneEngine};
use crate::error::{EngineError, SyncError};
use crate::options::InitOptions;

type PendingInit<E> = Pin<Box<dyn Future<Output = Result<E, EngineError>>>>;

/// Initialization state machine: `Idle -> Pending -> Ready`, falling back
/// to `Idle` on failure or disposal.
pub(crate) enum InitState<E> {
    Idle,
    /// The in-flight initialization, shared by every `init` call until it
    /// settles, plus the overrides of the call that started it.
    Pending {
        future: PendingInit<E>,
        opts: InitOptions,
    },
    Ready,
}

impl<F: EngineFactory> ViewerStore<F> {
    /// Create, initialize, and attach the engine.
    ///
    /// Calling again while a previous call is still pending (for example
    /// after that call's future was dropped) resumes the same
    /// initialization instead of creating a second engine. Calling once
    /// ready is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Engine`] if the engine fails to initialize or
    /// attach. The store returns to idle and may be initialized again.
    pub async fn init(
        &mut self,
        surface: &<EngineOf<F> as SceneEngine>::Surface,
        container: &<EngineOf<F> as SceneEngine>::Container,
        opts: InitOptions,
    ) -> Result<(), SyncError> {
        if matches!(self.init_state, InitState::Ready) {
            return Ok(());
        }
        if matches!(self.init_state, InitState::Idle) {
            let mut engine = self.factory.create();
            let surface = surface.clone();
            let container = container.clone();
            let future: PendingInit<EngineOf<F>> = Box::pin(async move {
                engine.init().await?;
                engine.attach(&surface, &container).await?;
                Ok::<_, EngineError>(engine)
            });
            self.init_state = InitState::Pending { future, opts };
            log::debug!("viewer {} initializing", self.instance_id);
        }

        let InitState::Pending { future, opts } = &mut self.init_state else {
            return Ok(());
        };
        let opts = *opts;
        let outcome = future.await;

        match outcome {
            Ok(mut engine) => {
                self.default_color = opts
                    .default_color
                    .unwrap_or(self.options.colors.default_structure);
                engine.set_background(
                    opts.background.unwrap_or(self.options.colors.background),
                );
                self.engine = Some(engine);
                self.init_state = InitState::Ready;
                self.snapshot.set(ViewerSnapshot { ready: true });
                log::info!("viewer {} ready", self.instance_id);
                Ok(())
            }
            Err(e) => {
                self.init_state = InitState::Idle;
                log::error!("viewer {} failed to initialize: {e}", self.instance_id);
                Err(e.into())
            }
        }
    }

    /// Whether the engine is initialized.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.init_state, InitState::Ready)
    }

    /// Unregister this instance's themes, tear the engine down, and forget
    /// all slot bookkeeping. The store can be initialized again afterwards.
    ///
    /// An initialization still pending is abandoned; if its engine is
    /// already up it is disposed as well.
    pub fn dispose(&mut self) {
        if let InitState::Pending { future, .. } =
            std::mem::replace(&mut self.init_state, InitState::Idle)
        {
            self.abandon_pending(future);
        }
        match self.engine.take() {
            Some(mut engine) => {
                self.themes.release_all(&mut engine);
                engine.dispose();
            }
            None => self.themes.forget_all(),
        }
        self.slots.clear();
        self.snapshot.set(ViewerSnapshot { ready: false });
        log::debug!("viewer {} disposed", self.instance_id);
    }

    /// Poll an abandoned initialization once more so an engine that has
    /// already finished coming up is disposed instead of dropped live.
    fn abandon_pending(&self, mut future: PendingInit<EngineOf<F>>) {
        let waker = Waker::from(Arc::new(NoopWake));
        let mut cx = Context::from_waker(&waker);
        let id = &self.instance_id;
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(Ok(mut engine)) => {
                engine.dispose();
                log::debug!("viewer {id} disposed its pending engine");
            }
            Poll::Ready(Err(e)) => {
                log::debug!("viewer {id} pending init failed during dispose: {e}");
            }
            Poll::Pending => log::warn!("viewer {id} dropped an engine still initializing"),
        }
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::pin::pin;
    use std::rc::Rc;

    use super::*;
    use crate::engine::recording::{EngineOp, FailurePlan, OpLog, RecordingEngine};
    use crate::error::EngineErrorKind;
    use crate::scene::{Color, ColorAssignment};
    use crate::store::test_support::{factory, pdb, ready_store};

    #[test]
    fn init_publishes_ready_and_sets_background() {
        let log = OpLog::default();
        let mut store = ViewerStore::new(factory(&log));
        let seen = Rc::new(Cell::new(false));
        let sink = seen.clone();
        let listener = store.subscribe(move |s| sink.set(s.ready));
        assert_eq!(store.listener_count(), 1);

        let bg = Color::from_rgb(1, 2, 3);
        let opts = InitOptions {
            background: Some(bg),
            default_color: Some(Color::from_rgb(9, 9, 9)),
        };
        pollster::block_on(store.init(&(), &(), opts)).unwrap();

        assert!(store.snapshot().ready);
        assert!(seen.get());
        assert_eq!(store.default_color(), Color::from_rgb(9, 9, 9));
        assert_eq!(store.engine().unwrap().background(), Some(bg));
        assert_eq!(
            log.snapshot(),
            vec![EngineOp::Init, EngineOp::Attach, EngineOp::SetBackground(bg)]
        );

        assert!(store.unsubscribe(listener));
        assert_eq!(store.listener_count(), 0);
        store.dispose();
        assert!(seen.get());
    }

    #[test]
    fn init_twice_creates_one_engine() {
        let created = Rc::new(Cell::new(0));
        let counter = created.clone();
        let mut store = ViewerStore::new(move || {
            counter.set(counter.get() + 1);
            RecordingEngine::new()
        });
        let opts = InitOptions::default();
        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        assert_eq!(created.get(), 1);
    }

    #[test]
    fn failed_init_returns_to_idle() {
        let attempts = Rc::new(Cell::new(0));
        let counter = attempts.clone();
        let mut store = ViewerStore::new(move || {
            counter.set(counter.get() + 1);
            RecordingEngine::new().with_failures(FailurePlan {
                attach: counter.get() == 1,
                ..FailurePlan::default()
            })
        });

        let opts = InitOptions::default();
        let err = pollster::block_on(store.init(&(), &(), opts)).unwrap_err();
        match err {
            SyncError::Engine(e) => assert_eq!(e.kind, EngineErrorKind::Attach),
            other => panic!("unexpected error {other}"),
        }
        assert!(!store.is_ready());
        assert!(!store.snapshot().ready);
        assert!(store.engine().is_none());

        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        assert!(store.is_ready());
        assert_eq!(attempts.get(), 2);
    }

    fn poll_once<T>(future: impl Future<Output = T>) -> Poll<T> {
        let mut future = pin!(future);
        let waker = Waker::from(Arc::new(NoopWake));
        future.as_mut().poll(&mut Context::from_waker(&waker))
    }

    /// Engine whose `init` stays pending for one poll.
    struct SlowInit {
        inner: RecordingEngine,
    }

    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                Poll::Ready(())
            } else {
                self.0 = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    impl SceneEngine for SlowInit {
        type Surface = ();
        type Container = ();
        type Structure = <RecordingEngine as SceneEngine>::Structure;
        type Node = <RecordingEngine as SceneEngine>::Node;
        type Label = <RecordingEngine as SceneEngine>::Label;
        type Loci = <RecordingEngine as SceneEngine>::Loci;

        async fn init(&mut self) -> Result<(), EngineError> {
            YieldOnce(false).await;
            self.inner.init().await
        }
        async fn attach(&mut self, s: &(), c: &()) -> Result<(), EngineError> {
            self.inner.attach(s, c).await
        }
        fn set_background(&mut self, color: Color) {
            self.inner.set_background(color);
        }
        fn request_draw(&mut self) {
            self.inner.request_draw();
        }
        fn pause(&mut self) {
            self.inner.pause();
        }
        fn resume(&mut self) {
            self.inner.resume();
        }
        fn reset_camera(&mut self) {
            self.inner.reset_camera();
        }
        fn clear(&mut self) {
            self.inner.clear();
        }
        fn dispose(&mut self) {
            self.inner.dispose();
        }
        fn register_color_theme(
            &mut self,
            theme: &crate::theme::IndexColorTheme,
        ) -> Result<(), EngineError> {
            self.inner.register_color_theme(theme)
        }
        fn unregister_color_theme(&mut self, name: &str) {
            self.inner.unregister_color_theme(name);
        }
        fn create_content(
            &mut self,
            content: &str,
        ) -> Result<crate::engine::ContentHandle, EngineError> {
            self.inner.create_content(content)
        }
        fn release_content(&mut self, handle: crate::engine::ContentHandle) {
            self.inner.release_content(handle);
        }
        async fn build_structure(
            &mut self,
            content: crate::engine::ContentHandle,
            format: crate::scene::StructureFormat,
            representation: &crate::scene::Representation,
            theme: &crate::theme::ThemeRef,
        ) -> Result<Self::Structure, EngineError> {
            self.inner
                .build_structure(content, format, representation, theme)
                .await
        }
        async fn update_theme(
            &mut self,
            structure: &Self::Structure,
            theme: &crate::theme::ThemeRef,
        ) -> Result<(), EngineError> {
            self.inner.update_theme(structure, theme).await
        }
        fn select_residues(
            &self,
            structure: &Self::Structure,
            range: std::ops::RangeInclusive<i32>,
        ) -> Result<Self::Loci, EngineError> {
            self.inner.select_residues(structure, range)
        }
        async fn clear_overpaint(
            &mut self,
            structure: &Self::Structure,
        ) -> Result<(), EngineError> {
            self.inner.clear_overpaint(structure).await
        }
        async fn set_overpaint(
            &mut self,
            structure: &Self::Structure,
            loci: &Self::Loci,
            color: Color,
        ) -> Result<(), EngineError> {
            self.inner.set_overpaint(structure, loci, color).await
        }
        async fn add_label(
            &mut self,
            loci: &Self::Loci,
            params: &crate::engine::LabelParams,
        ) -> Result<Self::Label, EngineError> {
            self.inner.add_label(loci, params).await
        }
        async fn insert_transform(
            &mut self,
            structure: &Self::Structure,
            matrix: glam::Mat4,
        ) -> Result<Self::Node, EngineError> {
            self.inner.insert_transform(structure, matrix).await
        }
        async fn commit(
            &mut self,
            edits: Vec<crate::engine::SceneEdit<Self::Label, Self::Node>>,
        ) -> Result<(), EngineError> {
            self.inner.commit(edits).await
        }
    }

    #[test]
    fn pending_init_is_shared_after_the_first_call_is_dropped() {
        let created = Rc::new(Cell::new(0));
        let counter = created.clone();
        let log = OpLog::default();
        let shared = log.clone();
        let mut store = ViewerStore::new(move || {
            counter.set(counter.get() + 1);
            SlowInit {
                inner: RecordingEngine::with_log(shared.clone()),
            }
        });

        let opts = InitOptions::default();
        assert!(poll_once(store.init(&(), &(), opts)).is_pending());
        assert!(!store.is_ready());

        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        assert!(store.is_ready());
        assert_eq!(created.get(), 1);
        assert_eq!(log.count(|op| matches!(op, EngineOp::Init)), 1);
    }

    #[test]
    fn dispose_unregisters_themes_and_allows_reinit() {
        let (mut store, log) = ready_store();
        let colors: ColorAssignment = [(1, Color::from_rgb(255, 0, 0))].into();
        let descriptors = vec![
            Some(pdb("a").with_color_assignment(colors.clone())),
            Some(pdb("b").with_color_assignment(colors)),
        ];
        let _ = pollster::block_on(store.ensure_structures(&descriptors, None));
        assert_eq!(store.theme_names().len(), 2);

        store.dispose();
        let ops = log.take();
        assert_eq!(
            ops.iter()
                .filter(|op| matches!(op, EngineOp::UnregisterTheme(_)))
                .count(),
            2
        );
        assert_eq!(ops.last(), Some(&EngineOp::Dispose));
        assert!(store.theme_names().is_empty());
        assert_eq!(store.slot_count(), 0);
        assert!(!store.snapshot().ready);

        let opts = InitOptions::default();
        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        let _ = pollster::block_on(store.ensure_structures(&descriptors, None));
        assert_eq!(store.engine().unwrap().structures().len(), 2);
    }

    #[test]
    fn dispose_while_pending_disposes_the_engine() {
        let log = OpLog::default();
        let shared = log.clone();
        let mut store = ViewerStore::new(move || SlowInit {
            inner: RecordingEngine::with_log(shared.clone()),
        });
        let opts = InitOptions::default();
        assert!(poll_once(store.init(&(), &(), opts)).is_pending());

        store.dispose();
        assert!(!store.is_ready());
        assert!(store.engine().is_none());
        assert_eq!(log.count(|op| *op == EngineOp::Dispose), 1);

        pollster::block_on(store.init(&(), &(), opts)).unwrap();
        assert!(store.is_ready());
        assert_eq!(log.count(|op| *op == EngineOp::Init), 2);
    }
}
