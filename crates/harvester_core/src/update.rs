use crate::{Effect, Msg, PageState, Phase};

/// Pure update function: applies a message to the paging state and returns
/// the effects the driver must run next. Messages that do not belong to the
/// current phase are ignored.
pub fn update(mut state: PageState, msg: Msg) -> (PageState, Vec<Effect>) {
    let effects = match (state.phase(), msg) {
        (Phase::Idle, Msg::Start) => next_step(&mut state),
        (Phase::Discovering, Msg::Discovered(instances)) => {
            if instances.is_empty() && !state.has_queued() {
                state.accept_discovery(instances);
                finish(&mut state)
            } else {
                state.accept_discovery(instances);
                next_step(&mut state)
            }
        }
        (Phase::Summarizing | Phase::PageRemaining, Msg::BatchSummarized(batch)) => {
            state.record_summaries(&batch);
            state.set_phase(Phase::Harvesting);
            vec![Effect::HarvestBatch(batch)]
        }
        (Phase::Harvesting, Msg::BatchHarvested { event_count }) => {
            state.record_harvest(event_count);
            if state.has_queued() {
                let batch = state.take_batch();
                state.set_phase(Phase::PageRemaining);
                vec![Effect::SummarizeBatch(batch)]
            } else {
                next_step(&mut state)
            }
        }
        _ => Vec::new(),
    };

    (state, effects)
}

/// Retained instances are always consumed before searching again.
fn next_step(state: &mut PageState) -> Vec<Effect> {
    if state.has_queued() {
        let batch = state.take_batch();
        state.set_phase(Phase::Summarizing);
        return vec![Effect::SummarizeBatch(batch)];
    }
    if state.discovery_exhausted() {
        return finish(state);
    }
    state.set_phase(Phase::Discovering);
    vec![Effect::Discover {
        offset: state.next_offset(),
    }]
}

fn finish(state: &mut PageState) -> Vec<Effect> {
    state.set_phase(Phase::Done);
    vec![Effect::Finished(state.stats())]
}
