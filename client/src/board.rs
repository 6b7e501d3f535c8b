use std::collections::{HashMap, HashSet};

use hatvenn_shared::{ChunkId, Destination, OwnerTag, Placement, SLOT_COUNT, VennState};

/// Where the current clue is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClueStage {
    #[default]
    NoClue,
    ClueShown,
    ChunksBootstrapped,
    VennComplete,
    CenterComplete,
}

impl ClueStage {
    /// Slots are frozen once the venn words are complete.
    pub fn accepts_snapshots(self) -> bool {
        !matches!(self, Self::VennComplete | Self::CenterComplete)
    }
}

/// A run of consecutive same-chunk entries in a slot sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub chunk: ChunkId,
    /// Distinct owners in the run, in sequence order.
    pub owners: Vec<OwnerTag>,
}

impl Block {
    pub fn is_owned_by(&self, owner: &OwnerTag) -> bool {
        self.owners.contains(owner)
    }
}

pub fn collapse_runs(sequence: &[Placement]) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    for placement in sequence {
        match blocks.last_mut() {
            Some(block) if block.chunk == *placement.chunk() => {
                if !block.owners.contains(placement.owner()) {
                    block.owners.push(placement.owner().clone());
                }
            }
            _ => blocks.push(Block {
                chunk: placement.chunk().clone(),
                owners: vec![placement.owner().clone()],
            }),
        }
    }
    blocks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotItem {
    /// The local player's draggable chunk element.
    Mine(ChunkId),
    /// Read-only element for a chunk placed by other players.
    Foreign(Block),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotView {
    pub items: Vec<SlotItem>,
}

impl SlotView {
    pub fn mine(&self) -> impl Iterator<Item = &ChunkId> + '_ {
        self.items.iter().filter_map(|item| match item {
            SlotItem::Mine(chunk) => Some(chunk),
            SlotItem::Foreign(_) => None,
        })
    }

    pub fn foreign(&self) -> impl Iterator<Item = &Block> + '_ {
        self.items.iter().filter_map(|item| match item {
            SlotItem::Foreign(block) => Some(block),
            SlotItem::Mine(_) => None,
        })
    }

    fn contains_mine(&self, chunk: &ChunkId) -> bool {
        self.mine().any(|c| c == chunk)
    }

    fn remove_mine(&mut self, chunk: &ChunkId) {
        self.items
            .retain(|item| !matches!(item, SlotItem::Mine(c) if c == chunk));
    }
}

/// Plain in-memory picture of the board that the renderer draws.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardView {
    /// Local chunks not placed in any slot.
    pub bank: Vec<ChunkId>,
    pub slots: [SlotView; SLOT_COUNT],
    pub words: Vec<String>,
    /// Completed slot words once the venn is solved.
    pub solved: Option<[String; SLOT_COUNT]>,
    pub center_answer: Option<String>,
}

impl BoardView {
    /// Where a local chunk is currently displayed.
    pub fn location_of(&self, chunk: &ChunkId) -> Option<Destination> {
        if self.bank.contains(chunk) {
            return Some(Destination::Bank);
        }
        self.slots
            .iter()
            .position(|slot| slot.contains_mine(chunk))
            .map(Destination::Slot)
    }

    fn detach(&mut self, chunk: &ChunkId) {
        self.bank.retain(|c| c != chunk);
        for slot in &mut self.slots {
            slot.remove_mine(chunk);
        }
    }

    fn attach(&mut self, chunk: ChunkId, destination: Destination) {
        match destination {
            Destination::Bank => self.bank.push(chunk),
            Destination::Slot(index) => self.slots[index].items.push(SlotItem::Mine(chunk)),
        }
    }
}

/// Location of every chunk in `inventory` according to `snapshot`. Chunks the snapshot
/// does not place are in the bank; a chunk listed in several slots takes the first.
pub fn authoritative_locations(
    snapshot: &VennState,
    local: &OwnerTag,
    inventory: &[ChunkId],
) -> HashMap<ChunkId, Destination> {
    let mut locations: HashMap<ChunkId, Destination> = inventory
        .iter()
        .map(|chunk| (chunk.clone(), Destination::Bank))
        .collect();
    for (index, sequence) in snapshot.targets.iter().enumerate() {
        for block in collapse_runs(sequence) {
            if block.is_owned_by(local)
                && let Some(location) = locations.get_mut(&block.chunk)
                && *location == Destination::Bank
            {
                *location = Destination::Slot(index);
            }
        }
    }
    locations
}

/// Rebuild the board from an authoritative snapshot.
///
/// Foreign elements are recomputed from scratch. Each local chunk is shown exactly once:
/// at its pending destination if a placement is still unconfirmed, otherwise where the
/// snapshot puts it. Applying the same snapshot twice yields the same view.
pub fn reconcile(
    old: &BoardView,
    snapshot: &VennState,
    local: &OwnerTag,
    inventory: &[ChunkId],
    pending: &HashMap<ChunkId, Destination>,
) -> BoardView {
    let authoritative = authoritative_locations(snapshot, local, inventory);
    let desired = |chunk: &ChunkId| {
        pending
            .get(chunk)
            .or_else(|| authoritative.get(chunk))
            .copied()
    };

    let mut shown: HashSet<ChunkId> = HashSet::new();
    let mut slots: [SlotView; SLOT_COUNT] = Default::default();

    for (index, sequence) in snapshot.targets.iter().enumerate() {
        let here = Destination::Slot(index);
        let slot = &mut slots[index];
        for block in collapse_runs(sequence) {
            if block.is_owned_by(local) {
                if desired(&block.chunk) == Some(here) && shown.insert(block.chunk.clone()) {
                    slot.items.push(SlotItem::Mine(block.chunk));
                }
            } else {
                slot.items.push(SlotItem::Foreign(block));
            }
        }
        // Drops the server has not echoed yet stay where the user put them.
        for chunk in old.slots[index].mine().chain(inventory.iter()) {
            if desired(chunk) == Some(here) && shown.insert(chunk.clone()) {
                slot.items.push(SlotItem::Mine(chunk.clone()));
            }
        }
    }

    let mut bank = Vec::new();
    for chunk in old.bank.iter().chain(inventory.iter()) {
        if desired(chunk) == Some(Destination::Bank) && shown.insert(chunk.clone()) {
            bank.push(chunk.clone());
        }
    }

    BoardView {
        bank,
        slots,
        words: old.words.clone(),
        solved: old.solved.clone(),
        center_answer: old.center_answer.clone(),
    }
}

/// An optimistic drop the next snapshots have not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPlacement {
    destination: Destination,
    /// The server answered 204. It may still have ignored the move, so the next snapshot
    /// decides where the chunk really is.
    acknowledged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Applied,
    Ignored(ClueStage),
}

/// Board state for one client: the rendered view plus what reconciliation needs.
#[derive(Debug, Clone)]
pub struct Board {
    local: OwnerTag,
    stage: ClueStage,
    /// Chunks handed to the local player for this clue. `None` until bootstrapped.
    inventory: Option<Vec<ChunkId>>,
    /// Optimistic drops not yet confirmed by a snapshot.
    pending: HashMap<ChunkId, PendingPlacement>,
    view: BoardView,
}

impl Board {
    pub fn new(local: OwnerTag) -> Self {
        Self {
            local,
            stage: ClueStage::NoClue,
            inventory: None,
            pending: HashMap::new(),
            view: BoardView::default(),
        }
    }

    pub fn local(&self) -> &OwnerTag {
        &self.local
    }

    pub fn stage(&self) -> ClueStage {
        self.stage
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn inventory(&self) -> &[ChunkId] {
        self.inventory.as_deref().unwrap_or(&[])
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.inventory.is_some()
    }

    pub fn pending_destination(&self, chunk: &ChunkId) -> Option<Destination> {
        self.pending.get(chunk).map(|pending| pending.destination)
    }

    pub fn reset_for_clue(&mut self) {
        self.stage = ClueStage::ClueShown;
        self.inventory = None;
        self.pending.clear();
        self.view = BoardView::default();
    }

    pub fn apply_snapshot(&mut self, snapshot: &VennState) -> SnapshotOutcome {
        if !self.stage.accepts_snapshots() {
            return SnapshotOutcome::Ignored(self.stage);
        }

        if self.inventory.is_none() {
            self.view.words = snapshot.words.clone();
            if let Some(chunks) = snapshot.inventory(&self.local) {
                self.inventory = Some(chunks.to_vec());
                self.view.bank = chunks.to_vec();
                self.stage = ClueStage::ChunksBootstrapped;
            }
        }

        let inventory = self.inventory.as_deref().unwrap_or(&[]);
        let authoritative = authoritative_locations(snapshot, &self.local, inventory);
        self.pending.retain(|chunk, pending| {
            !pending.acknowledged && authoritative.get(chunk) != Some(&pending.destination)
        });
        let pending: HashMap<ChunkId, Destination> = self
            .pending
            .iter()
            .map(|(chunk, pending)| (chunk.clone(), pending.destination))
            .collect();
        self.view = reconcile(&self.view, snapshot, &self.local, inventory, &pending);
        SnapshotOutcome::Applied
    }

    /// Optimistically show a local chunk at `destination` until a snapshot confirms it.
    /// Returns false when the chunk is not ours or the board is frozen.
    pub fn move_local(&mut self, chunk: &ChunkId, destination: Destination) -> bool {
        if !self.stage.accepts_snapshots() || !self.inventory().contains(chunk) {
            return false;
        }
        self.view.detach(chunk);
        self.view.attach(chunk.clone(), destination);
        self.pending.insert(
            chunk.clone(),
            PendingPlacement {
                destination,
                acknowledged: false,
            },
        );
        true
    }

    /// The server accepted a placement. The optimistic move stands until the next snapshot,
    /// which then wins even if it disagrees.
    pub fn placement_acknowledged(&mut self, chunk: &ChunkId, destination: Destination) {
        if let Some(pending) = self.pending.get_mut(chunk)
            && pending.destination == destination
        {
            pending.acknowledged = true;
        }
    }

    /// The server refused a placement. The optimistic move stays on screen, but the next
    /// snapshot is allowed to correct it.
    pub fn placement_rejected(&mut self, chunk: &ChunkId, destination: Destination) {
        if self.pending_destination(chunk) == Some(destination) {
            self.pending.remove(chunk);
        }
    }

    pub fn complete_venn(&mut self, targets: [String; SLOT_COUNT]) {
        self.freeze(ClueStage::VennComplete, targets);
        self.view.center_answer = None;
    }

    pub fn complete_center(&mut self, targets: [String; SLOT_COUNT], answer: String) {
        self.freeze(ClueStage::CenterComplete, targets);
        self.view.center_answer = Some(answer);
    }

    fn freeze(&mut self, stage: ClueStage, targets: [String; SLOT_COUNT]) {
        self.stage = stage;
        self.pending.clear();
        self.view.bank.clear();
        self.view.slots = Default::default();
        self.view.solved = Some(targets);
    }
}
