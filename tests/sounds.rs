mod common;

use ambience::{
    graph::{GainNode, NoiseNode, ParamId, ReverbNode},
    sounds::{ocean::FADE_DELAY, rain, BrownNoise, OceanWaves, Patch, Rain, SoundNode},
    GraphError,
};

use common::{live_count, peak, ready_engine, render, rms};

#[test]
fn brown_noise_is_audible_and_bounded() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    {
        let mut graph = engine.graph().lock().unwrap();
        BrownNoise::build(&mut graph, bus, 1.0).unwrap();
    }

    let out = render(engine.graph(), 1.0);
    let settled = &out[out.len() / 2..];

    assert!(out.iter().all(|s| s.is_finite()));
    assert!(rms(settled) > 1e-3, "rms {}", rms(settled));
    assert!(peak(&out) <= 1.0, "peak {}", peak(&out));
}

#[test]
fn brown_noise_mute_goes_silent() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut brown = {
        let mut graph = engine.graph().lock().unwrap();
        BrownNoise::build(&mut graph, bus, 1.0).unwrap()
    };
    render(engine.graph(), 0.5);

    {
        let mut graph = engine.graph().lock().unwrap();
        brown.set_volume(&mut graph, 0.0).unwrap();
        assert_eq!(graph.value(brown.output(), ParamId::Gain), Ok(0.0));
    }

    let out = render(engine.graph(), 0.2);
    assert!(peak(&out[out.len() / 2..]) < 1e-3);
}

#[test]
fn brown_noise_volume_glides() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut graph = engine.graph().lock().unwrap();
    let mut brown = BrownNoise::build(&mut graph, bus, 1.0).unwrap();

    let mut block = vec![0.0; 48_000];
    graph.render_block(&mut block);
    brown.set_volume(&mut graph, 0.5).unwrap();
    let now = graph.now();

    let gain = graph.param(brown.output(), ParamId::Gain).unwrap();
    assert!((gain.value_at(now) - 0.4).abs() < 1e-4);
    assert!((gain.value_at(now + 0.05) - 0.3).abs() < 1e-3);
    assert!((gain.value_at(now + 0.2) - 0.2).abs() < 1e-4);
}

#[test]
fn rain_lookahead_stays_bounded() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut graph = engine.graph().lock().unwrap();
    let rain = Rain::build_with(&mut graph, bus, 0.5, |task| task.lookahead(2.0).seed(7)).unwrap();

    // at most one drop per minimum interval inside the window
    let bound = (2.0 / 0.05) as usize + 1;
    let queued = graph.pending_triggers(rain.envelope()).unwrap();
    assert!(queued > 0 && queued <= bound, "queued {queued}");

    let mut block = vec![0.0; 72_000];
    graph.render_block(&mut block);

    let queued = graph.pending_triggers(rain.envelope()).unwrap();
    assert!(queued > 0 && queued <= bound, "queued {queued}");
    assert!(block.iter().all(|s| s.is_finite()));
    assert!(rms(&block[24_000..]) > 1e-4);
}

#[test]
fn rain_dispose_cancels_schedule() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut graph = engine.graph().lock().unwrap();
    let rain = Rain::build(&mut graph, bus, 0.5).unwrap();
    let task = rain.schedule().unwrap();
    let envelope = rain.envelope();
    assert!(graph.has_task(task));

    assert_eq!(SoundNode::from(rain).dispose(&mut graph), 0);

    assert!(!graph.has_task(task));
    assert!(!graph.contains(envelope));
    assert_eq!(graph.live_count(), 1);

    let mut block = vec![0.0; 4_800];
    graph.render_block(&mut block);
    assert!(peak(&block) < 1e-6);
}

#[test]
fn rain_fades_in_then_scales_both_layers() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut graph = engine.graph().lock().unwrap();
    let mut rain = Rain::build(&mut graph, bus, 1.0).unwrap();
    let [drops, ambient] = rain.gains();

    assert_eq!(graph.value(drops, ParamId::Gain), Ok(0.0));
    assert_eq!(graph.value(ambient, ParamId::Gain), Ok(0.0));

    let halfway = graph.now() + rain::FADE_IN / 2.0;
    let wash = graph.param(ambient, ParamId::Gain).unwrap();
    assert!((wash.value_at(halfway) - 0.15).abs() < 1e-3);

    let mut block = vec![0.0; 24_000];
    graph.render_block(&mut block);

    assert!((graph.value(drops, ParamId::Gain).unwrap() - 0.8).abs() < 1e-6);
    assert!((graph.value(ambient, ParamId::Gain).unwrap() - 0.3).abs() < 1e-6);

    rain.set_volume(&mut graph, 0.0).unwrap();
    assert_eq!(graph.value(drops, ParamId::Gain), Ok(0.0));
    assert_eq!(graph.value(ambient, ParamId::Gain), Ok(0.0));
}

#[test]
fn ocean_starts_silent_then_rolls_in() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let ocean = {
        let mut graph = engine.graph().lock().unwrap();
        OceanWaves::build(&mut graph, bus, 0.6).unwrap()
    };

    let early = render(engine.graph(), (FADE_DELAY * 0.5) as f32);
    assert!(peak(&early) < 1e-6);

    let late = render(engine.graph(), 4.0);
    assert!(late.iter().all(|s| s.is_finite()));
    assert!(rms(&late[late.len() / 2..]) > 1e-4);

    let graph = engine.graph().lock().unwrap();
    assert!((graph.value(ocean.master(), ParamId::Gain).unwrap() - 0.6).abs() < 1e-6);
    assert!((graph.value(ocean.output(), ParamId::Gain).unwrap() - 1.0).abs() < 1e-6);
    for source in ocean.sources() {
        let level = graph.value(source, ParamId::Level).unwrap();
        assert!(level.is_finite() && level < 0.0, "level {level}");
    }
}

#[test]
fn ocean_unmute_restores_levels() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut graph = engine.graph().lock().unwrap();
    let mut ocean = OceanWaves::build(&mut graph, bus, 1.0).unwrap();

    ocean.set_volume(&mut graph, 0.0).unwrap();
    assert!(ocean.is_muted());

    ocean.set_volume(&mut graph, 0.7).unwrap();
    assert!(!ocean.is_muted());

    let mut block = vec![0.0; 9_600];
    graph.render_block(&mut block);

    assert!((graph.value(ocean.master(), ParamId::Gain).unwrap() - 0.7).abs() < 1e-6);
    assert!((graph.value(ocean.output(), ParamId::Gain).unwrap() - 1.0).abs() < 1e-6);
    for source in ocean.sources() {
        assert!(graph.value(source, ParamId::Level).unwrap().is_finite());
    }
}

#[test]
fn ocean_dispose_releases_modulators() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut graph = engine.graph().lock().unwrap();
    let ocean = OceanWaves::build(&mut graph, bus, 1.0).unwrap();
    let nodes = ocean.nodes().to_vec();

    assert_eq!(ocean.dispose(&mut graph), 0);

    assert!(nodes.iter().all(|&id| !graph.contains(id)));
    assert_eq!(graph.live_count(), 1);
}

#[test]
fn failed_recipe_releases_partial_subgraph() {
    let engine = ready_engine();
    let mut graph = engine.graph().lock().unwrap();

    let result = Patch::build(&mut graph, |patch| {
        let noise = patch.add(NoiseNode::white())?;
        let gain = patch.add(GainNode::unity())?;
        patch.connect(noise, gain)?;
        patch.add(ReverbNode::new(2.0, 1.5))?;
        Ok(())
    });

    assert!(matches!(
        result,
        Err(GraphError::InvalidParameter { .. })
    ));
    assert_eq!(graph.live_count(), 1);
}

#[test]
fn sounds_share_the_bus() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    {
        let mut graph = engine.graph().lock().unwrap();
        BrownNoise::build(&mut graph, bus, 0.5).unwrap();
        Rain::build(&mut graph, bus, 0.5).unwrap();
        OceanWaves::build(&mut graph, bus, 0.5).unwrap();
    }

    let out = render(engine.graph(), 0.5);
    assert!(out.iter().all(|s| s.is_finite()));
    assert!(live_count(engine.graph()) > 3);
}

#[test]
fn muted_textures_decay_to_clean_zeros() {
    let engine = ready_engine();
    let bus = engine.bus().unwrap();
    let mut sounds: Vec<SoundNode> = {
        let mut graph = engine.graph().lock().unwrap();
        vec![
            BrownNoise::build(&mut graph, bus, 1.0).unwrap().into(),
            Rain::build(&mut graph, bus, 1.0).unwrap().into(),
            OceanWaves::build(&mut graph, bus, 1.0).unwrap().into(),
        ]
    };
    render(engine.graph(), 4.0);

    {
        let mut graph = engine.graph().lock().unwrap();
        for sound in &mut sounds {
            sound.set_volume(&mut graph, 0.0).unwrap();
        }
    }

    // filter, reverb and compressor state all decay through silence here
    let out = render(engine.graph(), 30.0);
    let subnormal = out.iter().filter(|s| s.is_subnormal()).count();
    assert_eq!(subnormal, 0);
    assert!(out[out.len() - 4_800..].iter().all(|&s| s == 0.0));
}
