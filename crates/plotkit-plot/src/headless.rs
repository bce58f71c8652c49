//! In-memory host.
//!
//! Implements every collaborator of the plot commands without a CAD
//! application: a drawing with an affine working-to-device transform, an
//! input service that replays a script, and a plot engine that records the
//! lifecycle calls it receives. Used by the tests and by the `plotkit`
//! scenario runner.

use parking_lot::{Condvar, Mutex};
use plotkit_core::{
    thread_safe_vec, CoordinateSpace, Error, Extents3d, Point2D, RawPoint3D, Result,
    SpaceConverter, ThreadSafeVec,
};
use plotkit_designer::{
    BlockId, DragSampler, DrawingDatabase, FilterAction, FilterId, FrameEntity, InputService,
    KeyEvent, KeyFilter, PointPromptOptions, PromptResult, SamplerStatus, TransactionId,
};
use plotkit_devicedb::{DeviceCatalog, StaticCatalog};
use plotkit_settings::PlotSettings;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::commands::{self, CommandContext};
use crate::config::{MatchingPolicy, PlotConfiguration, PlotOutput};
use crate::engine::{JobStep, PlotEngine, PlotJob, ProcessPlotState};
use crate::event::PlotEventDispatcher;
use crate::job::{JobReport, PlotJobRunner};

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Similarity transform from working space to device space:
/// `device = offset + scale * rotate(working, rotation)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffineTransform {
    pub scale: f64,
    /// Counter-clockwise, in degrees
    pub rotation: f64,
    pub offset: Point2D,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            offset: Point2D::default(),
        }
    }
}

impl AffineTransform {
    fn forward(&self, p: Point2D) -> Point2D {
        let r = p.rotated(self.rotation.to_radians());
        Point2D::new(
            self.offset.x + self.scale * r.x,
            self.offset.y + self.scale * r.y,
        )
    }

    fn inverse(&self, p: Point2D) -> Point2D {
        Point2D::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
        .rotated(-self.rotation.to_radians())
    }
}

impl SpaceConverter for AffineTransform {
    fn transform(
        &self,
        point: RawPoint3D,
        from: CoordinateSpace,
        to: CoordinateSpace,
    ) -> std::result::Result<RawPoint3D, String> {
        if self.scale == 0.0 || !self.scale.is_finite() {
            return Err(format!("degenerate view scale {}", self.scale));
        }
        let in_device = from == CoordinateSpace::Device;
        let out_device = to == CoordinateSpace::Device;
        let p = point.to_2d();
        let mapped = match (in_device, out_device) {
            (false, true) => self.forward(p),
            (true, false) => self.inverse(p),
            _ => p,
        };
        Ok(RawPoint3D::new(mapped.x, mapped.y, point.z))
    }
}

/// Drawing description of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSetup {
    pub path: PathBuf,
    pub layout: String,
    pub transform: AffineTransform,
}

impl Default for DrawingSetup {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/drawings/untitled.dwg"),
            layout: "Model".to_string(),
            transform: AffineTransform::default(),
        }
    }
}

#[derive(Debug, Default)]
struct FrameState {
    position: Point2D,
    rotation: f64,
}

struct SimFrame {
    outline: Vec<Point2D>,
    state: Rc<RefCell<FrameState>>,
}

impl FrameEntity for SimFrame {
    fn set_position(&mut self, position: Point2D) -> std::result::Result<(), String> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return Err(format!("invalid position {}", position));
        }
        self.state.borrow_mut().position = position;
        Ok(())
    }

    fn set_rotation(&mut self, radians: f64) -> std::result::Result<(), String> {
        self.state.borrow_mut().rotation = radians;
        Ok(())
    }

    fn geometric_extents(&self) -> std::result::Result<Extents3d, String> {
        let state = self.state.borrow();
        let placed: Vec<Point2D> = self
            .outline
            .iter()
            .map(|p| {
                let r = p.rotated(state.rotation);
                Point2D::new(r.x + state.position.x, r.y + state.position.y)
            })
            .collect();
        Extents3d::bounding(&placed).ok_or_else(|| "block has no geometry".to_string())
    }
}

/// Transaction log kept by [`SimDrawing`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionLog {
    pub started: usize,
    pub committed: usize,
    pub aborted: usize,
}

/// In-memory drawing database.
pub struct SimDrawing {
    setup: DrawingSetup,
    blocks: HashMap<String, (BlockId, Vec<Point2D>)>,
    references: Vec<(BlockId, Rc<RefCell<FrameState>>)>,
    pending_blocks: Vec<String>,
    pending_references: usize,
    open: Vec<TransactionId>,
    next_id: u64,
    log: TransactionLog,
}

impl SimDrawing {
    pub fn new(setup: DrawingSetup) -> Self {
        Self {
            setup,
            blocks: HashMap::new(),
            references: Vec::new(),
            pending_blocks: Vec::new(),
            pending_references: 0,
            open: Vec::new(),
            next_id: 0,
            log: TransactionLog::default(),
        }
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.log
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }
}

impl DrawingDatabase for SimDrawing {
    fn document_path(&self) -> PathBuf {
        self.setup.path.clone()
    }

    fn current_layout(&self) -> String {
        self.setup.layout.clone()
    }

    fn converter(&self) -> &dyn SpaceConverter {
        &self.setup.transform
    }

    fn start_transaction(&mut self) -> TransactionId {
        self.next_id += 1;
        let id = TransactionId(self.next_id);
        self.open.push(id);
        self.log.started += 1;
        id
    }

    fn commit_transaction(&mut self, id: TransactionId) -> std::result::Result<(), String> {
        if self.open.last() != Some(&id) {
            return Err(format!("{} is not the innermost transaction", id));
        }
        self.open.pop();
        if self.open.is_empty() {
            self.pending_blocks.clear();
            self.pending_references = 0;
        }
        self.log.committed += 1;
        Ok(())
    }

    fn abort_transaction(&mut self, id: TransactionId) {
        if let Some(pos) = self.open.iter().position(|t| *t == id) {
            self.open.truncate(pos);
        }
        for name in self.pending_blocks.drain(..) {
            self.blocks.remove(&name);
        }
        let keep = self.references.len() - self.pending_references;
        self.references.truncate(keep);
        self.pending_references = 0;
        self.log.aborted += 1;
    }

    fn block_id(&self, name: &str) -> Option<BlockId> {
        self.blocks.get(name).map(|(id, _)| *id)
    }

    fn define_block(
        &mut self,
        name: &str,
        outline: &[Point2D],
    ) -> std::result::Result<BlockId, String> {
        if self.open.is_empty() {
            return Err("no open transaction".to_string());
        }
        if outline.len() < 2 {
            return Err(format!("block {} needs at least two vertices", name));
        }
        self.next_id += 1;
        let id = BlockId(self.next_id);
        self.blocks
            .insert(name.to_string(), (id, outline.to_vec()));
        self.pending_blocks.push(name.to_string());
        Ok(id)
    }

    fn insert_reference(
        &mut self,
        block: BlockId,
        position: Point2D,
    ) -> std::result::Result<Box<dyn FrameEntity>, String> {
        if self.open.is_empty() {
            return Err("no open transaction".to_string());
        }
        let outline = self
            .blocks
            .values()
            .find(|(id, _)| *id == block)
            .map(|(_, outline)| outline.clone())
            .ok_or_else(|| format!("unknown block {}", block.0))?;
        let state = Rc::new(RefCell::new(FrameState {
            position,
            rotation: 0.0,
        }));
        self.references.push((block, Rc::clone(&state)));
        self.pending_references += 1;
        Ok(Box::new(SimFrame { outline, state }))
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One scripted operator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputStep {
    /// Answer a point prompt, or move the pointer during a drag
    Point { x: f64, y: f64 },
    /// Answer a string prompt
    Text { value: String },
    /// Type a keyword during a drag
    Keyword { value: String },
    /// Press a key during a drag; installed filters see it first
    Key { event: KeyEvent },
    /// Confirm the drag
    Confirm,
    /// Escape
    Cancel,
}

/// Input service that replays a script.
#[derive(Debug, Default)]
pub struct SimInput {
    script: VecDeque<InputStep>,
    filters: BTreeMap<u64, KeyFilter>,
    next_filter: u64,
    prompts: Vec<String>,
    messages: Vec<String>,
}

impl SimInput {
    pub fn new(script: impl IntoIterator<Item = InputStep>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Every prompt shown, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn active_filters(&self) -> usize {
        self.filters.len()
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    fn point_answer(&mut self, message: &str) -> PromptResult<RawPoint3D> {
        self.prompts.push(message.to_string());
        match self.script.pop_front() {
            Some(InputStep::Point { x, y }) => PromptResult::ok(RawPoint3D::new(x, y, 0.0)),
            Some(InputStep::Cancel) | None => PromptResult::cancel(),
            Some(other) => {
                warn!(?other, "unexpected step at a point prompt");
                PromptResult::cancel()
            }
        }
    }

    fn filtered(&self, event: &KeyEvent) -> Option<String> {
        self.filters
            .values()
            .find_map(|filter| match filter.filter(event) {
                FilterAction::Replace(command) => Some(command),
                FilterAction::PassThrough => None,
            })
    }
}

impl InputService for SimInput {
    fn get_point(&mut self, options: &PointPromptOptions) -> PromptResult<RawPoint3D> {
        self.point_answer(&options.message)
    }

    fn get_corner(&mut self, options: &PointPromptOptions) -> PromptResult<RawPoint3D> {
        self.point_answer(&options.message)
    }

    fn get_string(&mut self, message: &str, _allow_spaces: bool) -> PromptResult<String> {
        self.prompts.push(message.to_string());
        match self.script.pop_front() {
            Some(InputStep::Text { value }) => PromptResult::ok(value),
            Some(InputStep::Cancel) | None => PromptResult::cancel(),
            Some(other) => {
                warn!(?other, "unexpected step at a string prompt");
                PromptResult::cancel()
            }
        }
    }

    fn drag(&mut self, sampler: &mut dyn DragSampler) -> PromptResult<()> {
        self.prompts.push(sampler.prompt_options().message);
        while let Some(step) = self.script.pop_front() {
            match step {
                InputStep::Point { x, y } => {
                    let acquired = PromptResult::ok(RawPoint3D::new(x, y, 0.0));
                    match sampler.sample(&acquired) {
                        SamplerStatus::Ok => {
                            if !sampler.update() {
                                return PromptResult::cancel();
                            }
                        }
                        SamplerStatus::NoChange => {}
                        SamplerStatus::Cancel => return PromptResult::cancel(),
                    }
                }
                InputStep::Keyword { value } => return PromptResult::keyword(value),
                InputStep::Key { event } => match self.filtered(&event) {
                    Some(command) => return PromptResult::keyword(command),
                    None => debug!(?event, "key passed through"),
                },
                InputStep::Confirm => return PromptResult::ok(()),
                InputStep::Cancel => {
                    sampler.sample(&PromptResult::cancel());
                    return PromptResult::cancel();
                }
                InputStep::Text { value } => {
                    warn!(%value, "unexpected text during a drag");
                }
            }
        }
        sampler.sample(&PromptResult::cancel());
        PromptResult::cancel()
    }

    fn install_key_filter(&mut self, filter: KeyFilter) -> FilterId {
        self.next_filter += 1;
        self.filters.insert(self.next_filter, filter);
        FilterId(self.next_filter)
    }

    fn remove_key_filter(&mut self, id: FilterId) {
        self.filters.remove(&id.0);
    }

    fn write_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Rendezvous point that pauses a [`SimEngine`] at a step.
#[derive(Debug, Default)]
pub struct StepGate {
    state: Mutex<(bool, bool)>,
    signal: Condvar,
}

impl StepGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Blocks until the engine reaches the gated step.
    pub fn wait_reached(&self) {
        let mut state = self.state.lock();
        while !state.0 {
            self.signal.wait(&mut state);
        }
    }

    /// Lets the engine continue.
    pub fn release(&self) {
        self.state.lock().1 = true;
        self.signal.notify_all();
    }

    fn arrive_and_wait(&self) {
        let mut state = self.state.lock();
        state.0 = true;
        self.signal.notify_all();
        while !state.1 {
            self.signal.wait(&mut state);
        }
    }
}

/// Failure injection for a scenario's engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSetup {
    /// Step that reports an error
    pub fail_at: Option<JobStep>,
    /// Backend reports it is already plotting
    pub busy: bool,
}

/// Plot engine that validates against a catalog and records every call.
pub struct SimEngine {
    catalog: StaticCatalog,
    state: ProcessPlotState,
    fail_at: Option<JobStep>,
    panic_at: Option<JobStep>,
    hold_at: Option<(JobStep, Arc<StepGate>)>,
    steps: ThreadSafeVec<JobStep>,
    validated: Vec<PlotConfiguration>,
    outputs: Vec<PlotOutput>,
}

impl SimEngine {
    pub fn new(catalog: StaticCatalog) -> Self {
        Self {
            catalog,
            state: ProcessPlotState::NotPlotting,
            fail_at: None,
            panic_at: None,
            hold_at: None,
            steps: thread_safe_vec(),
            validated: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn from_setup(catalog: StaticCatalog, setup: &EngineSetup) -> Self {
        let mut engine = Self::new(catalog);
        engine.fail_at = setup.fail_at;
        if setup.busy {
            engine.state = ProcessPlotState::BackgroundPlotting;
        }
        engine
    }

    pub fn fail_at(mut self, step: JobStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Makes `step` panic instead of failing. Used by unwind tests that check
    /// the plot slot is released when a backend aborts mid-job.
    pub fn panic_at(mut self, step: JobStep) -> Self {
        self.panic_at = Some(step);
        self
    }

    pub fn hold_at(mut self, step: JobStep, gate: Arc<StepGate>) -> Self {
        self.hold_at = Some((step, gate));
        self
    }

    pub fn with_state(mut self, state: ProcessPlotState) -> Self {
        self.state = state;
        self
    }

    /// Shared handle on the step log, readable while a job runs elsewhere.
    pub fn step_log(&self) -> ThreadSafeVec<JobStep> {
        Arc::clone(&self.steps)
    }

    pub fn steps(&self) -> Vec<JobStep> {
        self.steps.lock().clone()
    }

    pub fn validated(&self) -> &[PlotConfiguration] {
        &self.validated
    }

    /// Outputs of the jobs that reached `end-plot`.
    pub fn outputs(&self) -> &[PlotOutput] {
        &self.outputs
    }
}

impl PlotEngine for SimEngine {
    fn state(&self) -> ProcessPlotState {
        self.state
    }

    fn validate(
        &mut self,
        config: &PlotConfiguration,
        policy: MatchingPolicy,
    ) -> std::result::Result<(), String> {
        let media = self
            .catalog
            .media(&config.device_name, &config.media.media_name)
            .map_err(|e| e.to_string())?;
        if policy == MatchingPolicy::MatchEnabled && media.page_size().area() <= 0.0 {
            return Err(format!("media {} has no printable area", media.name));
        }
        let supported = self
            .catalog
            .supports_style_sheet(&config.device_name, &config.style_sheet)
            .map_err(|e| e.to_string())?;
        if !supported {
            return Err(format!(
                "style sheet {} is not available for {}",
                config.style_sheet, config.device_name
            ));
        }
        if config.window.width() <= 0.0 || config.window.height() <= 0.0 {
            return Err(format!("plot window {} is empty", config.window));
        }
        self.validated.push(config.clone());
        Ok(())
    }

    fn step(&mut self, step: JobStep, job: &PlotJob<'_>) -> std::result::Result<(), String> {
        if let Some((at, gate)) = &self.hold_at {
            if *at == step {
                gate.arrive_and_wait();
            }
        }
        if self.panic_at == Some(step) {
            panic!("plot engine crashed at {}", step);
        }
        if self.fail_at == Some(step) {
            return Err(format!("device {} went offline", job.output.device_name));
        }
        self.steps.lock().push(step);
        if step == JobStep::EndPlot {
            self.outputs.push(job.output.clone());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// Operator command a scenario runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    PlotWindow,
    PlotTrueScale,
    PlotPdf,
}

/// A replayable plot command session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub command: CommandKind,
    #[serde(default)]
    pub drawing: DrawingSetup,
    pub catalog: StaticCatalog,
    #[serde(default)]
    pub input: Vec<InputStep>,
    #[serde(default)]
    pub engine: EngineSetup,
}

/// What a scenario run left behind.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub result: Result<JobReport>,
    pub steps: Vec<JobStep>,
    pub prompts: Vec<String>,
    pub transactions: TransactionLog,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let scenario: Self = serde_json::from_str(&content)
            .map_err(|e| Error::other(format!("{}: {}", path.display(), e)))?;
        scenario
            .catalog
            .validate()
            .map_err(|e| Error::other(format!("{}: {}", path.display(), e)))?;
        Ok(scenario)
    }

    /// Runs the command against a fresh headless host.
    pub fn run(self, settings: &PlotSettings, runner: &PlotJobRunner) -> ScenarioOutcome {
        info!(command = ?self.command, "running scenario");
        let mut drawing = SimDrawing::new(self.drawing);
        let mut input = SimInput::new(self.input);
        let mut engine = SimEngine::from_setup(self.catalog.clone(), &self.engine);

        let result = {
            let mut ctx = CommandContext {
                db: &mut drawing,
                input: &mut input,
                catalog: &self.catalog,
                engine: &mut engine,
                settings,
                runner,
            };
            match self.command {
                CommandKind::PlotWindow => commands::plot_window_scaled(&mut ctx),
                CommandKind::PlotTrueScale => commands::plot_true_scale_framed(&mut ctx),
                CommandKind::PlotPdf => commands::plot_window_pdf(&mut ctx),
            }
        };

        ScenarioOutcome {
            result,
            steps: engine.steps(),
            prompts: input.prompts().to_vec(),
            transactions: drawing.transactions().clone(),
        }
    }
}

/// Runner with its own slot and dispatcher, for isolated runs.
pub fn isolated_runner() -> PlotJobRunner {
    PlotJobRunner::new(
        Arc::new(crate::job::PlotSlot::new()),
        PlotEventDispatcher::default(),
    )
}
