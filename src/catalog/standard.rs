//! The standard card and zone set.
//!
//! Small on purpose: enough cards to exercise every step kind and every
//! trigger category, and one zone per slot with a few alternates.

use crate::cards::{CardDefinition, CardId, CardRegistry};
use crate::core::{Age, SLOT_COUNT};
use crate::effects::{
    AgeRule, Amount, CardRef, ChoiceBranch, Condition, DiscardSelector, OpponentFilter, Step,
    SubEffect, ZoneRule,
};
use crate::error::Result;
use crate::ledger::Shortfall;
use crate::triggers::TriggerCategory;
use crate::zones::{ZoneDefId, ZoneDefinition, ZoneRegistry};

use super::Catalog;

pub const ARTIST: CardId = CardId::new(1);
pub const GIZMO: CardId = CardId::new(2);
pub const TRINKET: CardId = CardId::new(3);
pub const BARBARIAN_HORDE: CardId = CardId::new(4);
pub const VISIONARY: CardId = CardId::new(5);
pub const GANG_OF_PICKPOCKETS: CardId = CardId::new(6);
pub const TAX_COLLECTOR: CardId = CardId::new(7);
pub const MISER: CardId = CardId::new(8);
pub const COURIER: CardId = CardId::new(9);
pub const ECHO_CHAMBER: CardId = CardId::new(10);
pub const PATRON: CardId = CardId::new(11);
pub const SCHOLAR: CardId = CardId::new(12);
pub const CHRONICLER: CardId = CardId::new(13);
pub const WARLORD: CardId = CardId::new(14);
pub const PEASANT: CardId = CardId::new(15);
pub const TRADE_GOODS: CardId = CardId::new(16);
pub const WANDERER: CardId = CardId::new(17);
pub const TIME_LOOP: CardId = CardId::new(18);
pub const ICONOCLAST: CardId = CardId::new(19);
pub const EXILE: CardId = CardId::new(20);

pub const PRIMORDIAL_SOUP: ZoneDefId = ZoneDefId::new(0);
pub const BRONZE_FORGE: ZoneDefId = ZoneDefId::new(1);
pub const GREAT_LIBRARY: ZoneDefId = ZoneDefId::new(2);
pub const CRUSADES: ZoneDefId = ZoneDefId::new(3);
pub const ROYAL_COURT: ZoneDefId = ZoneDefId::new(4);
pub const TIME_LAB: ZoneDefId = ZoneDefId::new(5);
pub const COLD_WAR: ZoneDefId = ZoneDefId::new(6);
pub const SPACE_RACE: ZoneDefId = ZoneDefId::new(7);
pub const TEMPORAL_RIFT: ZoneDefId = ZoneDefId::new(8);
pub const STOCK_EXCHANGE: ZoneDefId = ZoneDefId::new(9);
pub const CAMPFIRE: ZoneDefId = ZoneDefId::new(10);
pub const BURNING_LIBRARY: ZoneDefId = ZoneDefId::new(12);
pub const TEMPORAL_NEXUS: ZoneDefId = ZoneDefId::new(18);

/// Default slot bindings, slot 0 first.
pub const DEFAULT_BINDINGS: [ZoneDefId; SLOT_COUNT] = [
    PRIMORDIAL_SOUP,
    BRONZE_FORGE,
    GREAT_LIBRARY,
    CRUSADES,
    ROYAL_COURT,
    TIME_LAB,
    COLD_WAR,
    SPACE_RACE,
    TEMPORAL_RIFT,
    STOCK_EXCHANGE,
];

fn cards() -> Result<CardRegistry> {
    let mut r = CardRegistry::new();

    r.register(CardDefinition::new(ARTIST, "Artist").on_play([Step::gain(6)]))?;
    r.register(
        CardDefinition::new(GIZMO, "Gizmo").on_play([Step::SubEffect(SubEffect::ChooseFromHand)]),
    )?;
    r.register(CardDefinition::new(TRINKET, "Trinket").on_play([Step::PlayFromHand { times: 2 }]))?;
    r.register(CardDefinition::new(BARBARIAN_HORDE, "Barbarian Horde").on_play([
        Step::gain(9),
        Step::DiscardCards(DiscardSelector::Many { min: 0, max: None }),
        Step::DrawCards(Amount::Discarded),
    ]))?;
    r.register(
        CardDefinition::new(VISIONARY, "Visionary").on_play([Step::AdvanceCrown(AgeRule::Choose)]),
    )?;
    r.register(
        CardDefinition::new(GANG_OF_PICKPOCKETS, "Gang of Pickpockets")
            .on_play([Step::perpetual(TriggerCategory::PostPlay)])
            .on_trigger([Step::draw(1)]),
    )?;
    r.register(CardDefinition::new(TAX_COLLECTOR, "Tax Collector").on_play([
        Step::gain(2),
        Step::ForEachOpponent {
            filter: OpponentFilter::SameZone,
            steps: vec![Step::lose(2, Shortfall::PayWhatYouCan)],
        },
    ]))?;
    r.register(
        CardDefinition::new(MISER, "Miser")
            .on_play([Step::perpetual(TriggerCategory::PostScore)])
            .on_trigger([
                Step::discard_one(true),
                Step::when(Condition::DiscardedAtLeast(1), [Step::gain(3)]),
            ]),
    )?;
    r.register(CardDefinition::new(COURIER, "Courier").on_play([Step::PassCard, Step::draw(2)]))?;
    r.register(CardDefinition::new(ECHO_CHAMBER, "Echo Chamber").on_play([Step::SubEffect(
        SubEffect::ReplayPerpetual { with_hand_card: true },
    )]))?;
    r.register(
        CardDefinition::new(PATRON, "Patron")
            .on_play([Step::gain(1)])
            .on_score([
                Step::lose(4, Shortfall::SkipRest),
                Step::AdvanceCrown(AgeRule::CurrentZone),
            ]),
    )?;
    r.register(CardDefinition::new(SCHOLAR, "Scholar").on_play([Step::choice(
        "Scholar: gain 3 coins or draw 2 cards",
        [
            ChoiceBranch::new("Gain 3 coins", [Step::gain(3)]),
            ChoiceBranch::new("Draw 2 cards", [Step::draw(2)]),
        ],
    )]))?;
    r.register(
        CardDefinition::new(CHRONICLER, "Chronicler")
            .on_play([Step::perpetual(TriggerCategory::TurnEnd)])
            .on_trigger([Step::gain(1)]),
    )?;
    r.register(CardDefinition::new(WARLORD, "Warlord").on_play([Step::If {
        condition: Condition::RulesAge {
            age: AgeRule::CurrentZone,
            sole: false,
        },
        then: vec![Step::gain(4)],
        otherwise: vec![Step::gain(1)],
    }]))?;
    r.register(
        CardDefinition::new(PEASANT, "Peasant")
            .on_play([Step::gain(1)])
            .on_score([Step::AdvanceCrown(AgeRule::CurrentZone)]),
    )?;
    r.register(CardDefinition::new(TRADE_GOODS, "Trade Goods").on_play([Step::gain(1)]))?;
    r.register(
        CardDefinition::new(WANDERER, "Wanderer")
            .on_play([Step::MoveToZone(ZoneRule::Choose { optional: true }), Step::gain(1)]),
    )?;
    r.register(CardDefinition::new(TIME_LOOP, "Time Loop").on_play([Step::ExtraTurn]))?;
    r.register(CardDefinition::new(ICONOCLAST, "Iconoclast").on_play([
        Step::RemovePerpetual {
            card: CardRef::Chosen,
            category: None,
        },
        Step::gain(2),
    ]))?;
    r.register(
        CardDefinition::new(EXILE, "Exile")
            .on_play([Step::gain(2)])
            .on_score([Step::RetreatCrown(AgeRule::Choose), Step::gain(5)]),
    )?;

    Ok(r)
}

fn zones() -> Result<ZoneRegistry> {
    let mut r = ZoneRegistry::new();

    r.register(
        ZoneDefinition::new(PRIMORDIAL_SOUP, "Primordial Soup", Age::I)
            .with_script([Step::gain(1)])
            .with_alternate(CAMPFIRE),
    )?;
    r.register(
        ZoneDefinition::new(CAMPFIRE, "Campfire", Age::I)
            .with_script([Step::PlaceBase])
            .with_alternate(PRIMORDIAL_SOUP)
            .with_bases(2),
    )?;
    r.register(
        ZoneDefinition::new(BRONZE_FORGE, "Bronze Forge", Age::II)
            .with_script([Step::gain(2), Step::PlaceBase])
            .with_bases(2),
    )?;
    r.register(
        ZoneDefinition::new(GREAT_LIBRARY, "Great Library", Age::II)
            .with_script([Step::draw(2), Step::discard_one(false)])
            .with_alternate(BURNING_LIBRARY),
    )?;
    r.register(
        ZoneDefinition::new(BURNING_LIBRARY, "Burning Library", Age::II)
            .with_script([Step::gain(4)])
            .with_alternate(GREAT_LIBRARY),
    )?;
    r.register(ZoneDefinition::new(CRUSADES, "Crusades", Age::III).with_script([
        Step::gain(1),
        Step::ForEachOpponent {
            filter: OpponentFilter::InAge(AgeRule::CurrentZone),
            steps: vec![Step::discard_one(false)],
        },
    ]))?;
    r.register(
        ZoneDefinition::new(ROYAL_COURT, "Royal Court", Age::III)
            .with_script([Step::GrantActions(1), Step::PlaceHq])
            .allow_hq(),
    )?;
    r.register(ZoneDefinition::new(TIME_LAB, "Time Lab", Age::III).with_script([Step::ChangeHistory]))?;
    r.register(
        ZoneDefinition::new(COLD_WAR, "Cold War", Age::IV).with_script([Step::draw(1), Step::gain(2)]),
    )?;
    r.register(
        ZoneDefinition::new(SPACE_RACE, "Space Race", Age::IV)
            .with_script([Step::AdvanceCrown(AgeRule::CurrentZone)]),
    )?;
    r.register(
        ZoneDefinition::new(TEMPORAL_RIFT, "Temporal Rift", Age::IV)
            .with_script([
                Step::TickHourglass,
                Step::If {
                    condition: Condition::HourglassAtLeast(3),
                    then: vec![Step::BecomeReal],
                    otherwise: vec![Step::gain(1)],
                },
            ])
            .with_hourglass(3)
            .simulating(TEMPORAL_NEXUS),
    )?;
    r.register(
        ZoneDefinition::new(TEMPORAL_NEXUS, "Temporal Nexus", Age::IV)
            .with_script([Step::gain(5), Step::draw(1)]),
    )?;
    r.register(
        ZoneDefinition::new(STOCK_EXCHANGE, "Stock Exchange", Age::IV)
            .with_script([Step::lose(3, Shortfall::SkipRest), Step::gain(7)]),
    )?;

    Ok(r)
}

fn deck() -> Vec<CardId> {
    let counts: [(CardId, usize); 20] = [
        (ARTIST, 3),
        (TRADE_GOODS, 4),
        (PEASANT, 3),
        (PATRON, 2),
        (SCHOLAR, 2),
        (WARLORD, 2),
        (COURIER, 1),
        (TAX_COLLECTOR, 1),
        (BARBARIAN_HORDE, 1),
        (VISIONARY, 1),
        (GIZMO, 1),
        (TRINKET, 1),
        (GANG_OF_PICKPOCKETS, 1),
        (MISER, 1),
        (CHRONICLER, 1),
        (ECHO_CHAMBER, 1),
        (WANDERER, 1),
        (TIME_LOOP, 1),
        (ICONOCLAST, 1),
        (EXILE, 1),
    ];
    counts
        .iter()
        .flat_map(|(card, n)| std::iter::repeat(*card).take(*n))
        .collect()
}

/// Build the standard catalog.
pub fn build() -> Result<Catalog> {
    Catalog::new(cards()?, zones()?, DEFAULT_BINDINGS, deck())
}
