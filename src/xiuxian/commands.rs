//! Text command adapter.
//!
//! Parses chat-style input (the Chinese verbs players type, plus English aliases) into
//! [`XiuxianCommand`] and renders the service's structured results as plain text. No game
//! rules live here.

use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::logutil::escape_log;
use crate::xiuxian::breakthrough::BreakthroughReport;
use crate::xiuxian::combat::{CombatEvent, DuelOutcome, Side, VictoryKind};
use crate::xiuxian::confirm::ConfirmationStore;
use crate::xiuxian::effect::{CombatEffectOutcome, PlayerEffectOutcome};
use crate::xiuxian::errors::{Conflict, Missing, Unusable, XiuxianError};
use crate::xiuxian::ranking::{RankingEntry, RankingKind};
use crate::xiuxian::realm;
use crate::xiuxian::seclusion::SeclusionSummary;
use crate::xiuxian::service::{
    CheckinReport, DuelReport, EquipReport, GameService, InventoryLine, LearnReport,
    PurchaseReport, StatusReport, UseReport,
};
use crate::xiuxian::types::{EquipmentSlot, ItemCategory, ItemRecord, PlayerRecord, StatKind};

/// Player commands recognised by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XiuxianCommand {
    Create(Option<String>), // 我要修仙 [道号]
    Status,                 // 修仙面板
    EnterSeclusion,         // 闭关
    ExitSeclusion,          // 出关
    Breakthrough,           // 突破
    Checkin,                // 修仙签到
    Use(String),            // 使用 物品
    Learn(String),          // 学习 秘籍
    Ranking(Option<String>), // 修仙排行 [修为/境界/财富]
    Duel(String),           // 切磋 对方
    Inventory,              // 储物戒
    Equip(String),          // 装备 物品
    Unequip(String),        // 卸下 物品
    Shop,                   // 坊市
    Buy { item: String, quantity: u32 }, // 购买 物品 [数量]
    Reset,                  // 重置修仙数据
    Help,                   // 修仙帮助

    /// Verb recognised but arguments missing; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

const NOT_STARTED: &str = "你尚未踏入仙途，请发送 我要修仙 开始。";

/// Parse raw input. A leading `/` is ignored, as are surrounding spaces.
pub fn parse_command(input: &str) -> XiuxianCommand {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input).trim();
    let (verb, rest) = match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (input, ""),
    };
    let arg = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };

    match verb.to_lowercase().as_str() {
        "我要修仙" | "create" | "start" => XiuxianCommand::Create(arg),
        "修仙面板" | "面板" | "status" | "score" => XiuxianCommand::Status,
        "闭关" | "seclude" => XiuxianCommand::EnterSeclusion,
        "出关" | "emerge" => XiuxianCommand::ExitSeclusion,
        "突破" | "breakthrough" => XiuxianCommand::Breakthrough,
        "修仙签到" | "签到" | "checkin" => XiuxianCommand::Checkin,
        "使用" | "use" => arg.map_or(
            XiuxianCommand::Usage("使用 [物品名称]"),
            XiuxianCommand::Use,
        ),
        "学习" | "learn" => arg.map_or(
            XiuxianCommand::Usage("学习 [功法名称]"),
            XiuxianCommand::Learn,
        ),
        "修仙排行" | "排行" | "rank" | "ranking" => XiuxianCommand::Ranking(arg),
        "切磋" | "duel" => match arg {
            Some(target) => {
                let target = target.trim_start_matches('@').trim().to_string();
                if target.is_empty() {
                    XiuxianCommand::Usage("切磋 [对方ID]")
                } else {
                    XiuxianCommand::Duel(target)
                }
            }
            None => XiuxianCommand::Usage("切磋 [对方ID]"),
        },
        "储物戒" | "背包" | "inventory" | "inv" | "i" => XiuxianCommand::Inventory,
        "装备" | "equip" => arg.map_or(
            XiuxianCommand::Usage("装备 [物品名称]"),
            XiuxianCommand::Equip,
        ),
        "卸下" | "unequip" => arg.map_or(
            XiuxianCommand::Usage("卸下 [物品名称]"),
            XiuxianCommand::Unequip,
        ),
        "坊市" | "shop" => XiuxianCommand::Shop,
        "购买" | "buy" => match arg {
            Some(rest) => parse_purchase(&rest),
            None => XiuxianCommand::Usage("购买 [物品名称] [数量]"),
        },
        "重置修仙数据" | "reset" => XiuxianCommand::Reset,
        "修仙帮助" | "帮助" | "help" | "h" | "?" => XiuxianCommand::Help,
        _ => XiuxianCommand::Unknown(input.to_string()),
    }
}

/// `名称` or `名称 数量`. A trailing token that is not a positive number is part of the name.
fn parse_purchase(rest: &str) -> XiuxianCommand {
    if let Some((name, qty)) = rest.rsplit_once(char::is_whitespace) {
        if let Ok(quantity) = qty.trim().parse::<u32>() {
            if quantity == 0 {
                return XiuxianCommand::Usage("购买 [物品名称] [数量]");
            }
            return XiuxianCommand::Buy {
                item: name.trim().to_string(),
                quantity,
            };
        }
    }
    XiuxianCommand::Buy {
        item: rest.to_string(),
        quantity: 1,
    }
}

/// Dispatches parsed commands to a [`GameService`] and renders the replies.
pub struct CommandProcessor {
    service: GameService,
    confirmations: ConfirmationStore,
}

impl CommandProcessor {
    pub fn new(service: GameService) -> Self {
        let confirmations = service.reset_confirmations();
        Self {
            service,
            confirmations,
        }
    }

    pub fn service(&self) -> &GameService {
        &self.service
    }

    /// Handle one line of input from `sender_id`. Always produces a reply.
    pub fn process(&self, sender_id: &str, sender_name: &str, input: &str, now: DateTime<Utc>) -> String {
        let command = parse_command(input);
        debug!(
            "command from {}: {:?}",
            escape_log(sender_id),
            command
        );
        let svc = &self.service;
        let reply = match &command {
            XiuxianCommand::Create(name) => svc
                .create_character(sender_id, name.as_deref().unwrap_or(sender_name), now)
                .map(|p| render_created(&p, &svc.config().name)),
            XiuxianCommand::Status => svc.show_status(sender_id, now).map(|s| render_status(&s)),
            XiuxianCommand::EnterSeclusion => svc
                .start_seclusion(sender_id, now)
                .map(|_| "你已进入闭关状态，灵气正源源不断地汇入你的体内...\n(发送 出关 来查看成果)".to_string()),
            XiuxianCommand::ExitSeclusion => svc.end_seclusion(sender_id, now).map(|s| render_seclusion(&s)),
            XiuxianCommand::Breakthrough => svc
                .attempt_breakthrough(sender_id, now)
                .map(|r| render_breakthrough(&r)),
            XiuxianCommand::Checkin => svc.daily_checkin(sender_id, now).map(|r| render_checkin(&r)),
            XiuxianCommand::Use(item) => svc.use_item(sender_id, item, now).map(|r| render_use(&r)),
            XiuxianCommand::Learn(item) => svc.learn_skill(sender_id, item, now).map(|r| render_learn(&r)),
            XiuxianCommand::Ranking(kind) => match RankingKind::parse(kind.as_deref().unwrap_or("")) {
                Some(kind) => svc.show_ranking(kind).map(|entries| render_ranking(kind, &entries)),
                None => Ok("无效的排行榜类型。支持的类型: 修为, 境界, 财富".to_string()),
            },
            XiuxianCommand::Duel(target) => svc.duel(sender_id, target, now).map(|r| render_duel(&r)),
            XiuxianCommand::Inventory => svc.show_inventory(sender_id).map(|lines| render_inventory(&lines)),
            XiuxianCommand::Equip(item) => svc.equip_item(sender_id, item, now).map(|r| render_equip(&r)),
            XiuxianCommand::Unequip(item) => svc
                .unequip_item(sender_id, item, now)
                .map(|r| format!("你卸下了【{}】。\n{}", r.item_name, render_stat_line(&r))),
            XiuxianCommand::Shop => svc.show_shop().map(|items| render_shop(&items)),
            XiuxianCommand::Buy { item, quantity } => svc
                .buy_item(sender_id, item, *quantity, now)
                .map(|r| render_purchase(&r)),
            XiuxianCommand::Reset => svc
                .reset_data(sender_id, &self.confirmations, now)
                .map(|()| "你的所有尘缘已了，重入轮回。".to_string()),
            XiuxianCommand::Help => Ok(help_text()),
            XiuxianCommand::Usage(usage) => Ok(format!("用法: {}", usage)),
            XiuxianCommand::Unknown(raw) => Ok(format!(
                "未知指令: {}\n发送 修仙帮助 查看全部指令。",
                raw
            )),
        };
        reply.unwrap_or_else(|e| render_error(&command, sender_id, &e))
    }
}

fn render_error(command: &XiuxianCommand, sender_id: &str, err: &XiuxianError) -> String {
    if !err.is_gameplay() {
        error!(
            "command {:?} from {} failed: {}",
            command,
            escape_log(sender_id),
            err
        );
        return "天机紊乱，请稍后再试。".to_string();
    }
    match (command, err) {
        (_, XiuxianError::InvalidState(Conflict::AlreadyCultivating)) => {
            "道友已经踏入仙途，无需重复入门。".to_string()
        }
        (_, XiuxianError::InvalidState(Conflict::InvalidIdentity(detail))) => format!("无法入门：{}", detail),
        (XiuxianCommand::Duel(target), XiuxianError::NotFound(Missing::Player(id))) if id == target => {
            "对方尚未踏入仙途。".to_string()
        }
        (_, XiuxianError::InvalidState(Conflict::SelfDuel)) => "道友，不可与自己为敌。".to_string(),
        (_, XiuxianError::NotFound(Missing::Player(_))) => NOT_STARTED.to_string(),
        (XiuxianCommand::Breakthrough, XiuxianError::InvalidState(Conflict::InSeclusion)) => {
            "闭关期间心神不宁，无法突破，请先 出关。".to_string()
        }
        (_, XiuxianError::InvalidState(Conflict::InSeclusion)) => "你正在闭关中，请勿打扰。".to_string(),
        (_, XiuxianError::InvalidState(Conflict::NotInSeclusion)) => "你并未在闭关状态。".to_string(),
        (_, XiuxianError::InvalidState(Conflict::AtPeak)) => {
            "恭喜道友！你已是此界之巅，无需再突破了！".to_string()
        }
        (XiuxianCommand::Breakthrough, XiuxianError::InsufficientResource { needed, available, .. }) => {
            format!("修为不足，无法突破！\n当前修为：{}\n需要修为：{}", available, needed)
        }
        (XiuxianCommand::Checkin, XiuxianError::RateLimited(_)) => "道友今日已签到，请明日再来。".to_string(),
        (XiuxianCommand::Learn(item), XiuxianError::NotFound(_)) => {
            format!("你的储物戒里没有【{}】这本秘籍。", item.trim())
        }
        (XiuxianCommand::Use(item), XiuxianError::NotFound(_))
        | (XiuxianCommand::Equip(item), XiuxianError::NotFound(_)) => {
            format!("你的储物戒里没有【{}】。", item.trim())
        }
        (_, XiuxianError::NotApplicable(reason)) => render_unusable(reason),
        (_, XiuxianError::InvalidState(Conflict::AlreadyLearned(skill))) => {
            format!("你已经掌握了【{}】，无需重复学习。", skill)
        }
        (_, XiuxianError::InvalidState(Conflict::AlreadyEquipped(item))) => {
            format!("【{}】已经装备在身上了。", item)
        }
        (_, XiuxianError::InvalidState(Conflict::NotEquipped(item))) => {
            format!("你身上并没有装备【{}】。", item)
        }
        (XiuxianCommand::Buy { .. }, XiuxianError::NotFound(_)) => "坊市中没有此物出售。".to_string(),
        (XiuxianCommand::Buy { .. }, XiuxianError::InsufficientResource { needed, available, .. }) => {
            format!("你的灵石不足！需要 {}，你只有 {}。", needed, available)
        }
        (XiuxianCommand::Reset, XiuxianError::RateLimited(_)) => {
            "道友，天命不可常改，每日仅有一次重入轮回之机。请明日再来吧。".to_string()
        }
        (XiuxianCommand::Reset, XiuxianError::Unconfirmed { window_secs }) => format!(
            "此举将删除你的全部修仙数据，且无法恢复！\n请在 {} 秒内再次发送 重置修仙数据 以确认。",
            window_secs
        ),
        (_, XiuxianError::InsufficientResource { needed, available, .. }) => {
            format!("资源不足：需要 {}，现有 {}。", needed, available)
        }
        (_, other) => format!("无法执行：{}", other),
    }
}

fn render_unusable(reason: &Unusable) -> String {
    match reason {
        Unusable::SkillBook(item) => format!("【{}】是功法秘籍，请使用 学习 {}。", item, item),
        Unusable::Equipment(item) => format!("【{}】是法宝装备，请使用 装备 {}。", item, item),
        Unusable::NotEquipment(item) => format!("【{}】无法装备。", item),
        Unusable::BreakthroughOnly => "此丹会在突破时自动服用。".to_string(),
        Unusable::DuelOnly => "此物会在切磋开始时自动服用。".to_string(),
        Unusable::WrongRealm => "此丹药力与你当前境界不符。".to_string(),
        Unusable::NotPermanent(_)
        | Unusable::CombatOnly(_)
        | Unusable::PassiveOnly(_)
        | Unusable::NotInCombat(_)
        | Unusable::Unrecognized => "此物似乎不能这样使用。".to_string(),
    }
}

fn render_created(player: &PlayerRecord, world: &str) -> String {
    format!(
        "恭喜道友 {} 踏入{}！\n你的灵根是【{}灵根】：{}\n初始灵石：{}\n发送 修仙帮助 查看指令。",
        player.display_name,
        world,
        player.spirit_root.name(),
        player.spirit_root.description(),
        player.gold
    )
}

fn render_status(status: &StatusReport) -> String {
    let p = &status.player;
    let progress = if status.realm.is_terminal() {
        format!("{} (已至巅峰)", p.exp)
    } else {
        format!("{} / {}", p.exp, status.realm.exp_needed)
    };
    let mut out = format!(
        "--- 道友 {} 的信息 ---\n灵根: 【{}灵根】\n境界: {}\n修为: {}\n灵石: {}\n宗门: {}\n气血: {} / {}\n攻击: {}\n防御: {}\n",
        p.display_name,
        p.spirit_root.name(),
        status.realm.full_name,
        progress,
        p.gold,
        p.faction.as_deref().unwrap_or("无"),
        p.hp,
        p.max_hp,
        p.attack,
        p.defense
    );
    if p.is_in_seclusion() {
        out.push_str("状态: 闭关中...");
        if status.seclusion_gain > 0 {
            out.push_str(&format!(" (本次感悟 +{} 修为)", status.seclusion_gain));
        }
        out.push('\n');
    } else {
        out.push_str("状态: 修炼中\n");
    }
    if !p.skills.is_empty() {
        let names: Vec<&str> = p.skills.keys().map(String::as_str).collect();
        out.push_str(&format!("功法: {}\n", names.join("、")));
    }
    out.push_str(&format!("仙途始于: {}", p.created_at.format("%Y-%m-%d %H:%M")));
    out
}

fn render_seclusion(summary: &SeclusionSummary) -> String {
    let minutes = summary.elapsed.num_minutes();
    format!(
        "你结束了闭关，共历时 {} 小时 {} 分钟。\n此番闭关共获得 {} 点修为，当前修为 {}。",
        minutes / 60,
        minutes % 60,
        summary.exp_gained,
        summary.total_exp
    )
}

fn render_breakthrough(report: &BreakthroughReport) -> String {
    let elixir = report
        .elixir
        .as_ref()
        .map(|e| {
            format!(
                "\n你服下了【{}】，感觉突破的把握更大了！(成功率+{:.1}%)",
                e.item_name,
                e.bonus * 100.0
            )
        })
        .unwrap_or_default();
    if report.success {
        let info = realm::realm_info(report.to.0, report.to.1);
        format!(
            "天降祥瑞，恭喜道友成功突破到了【{}】！{}",
            info.full_name, elixir
        )
    } else {
        format!(
            "突破失败！你被心魔所噬，气息紊乱，修为倒退了 {} 点。{}",
            report.penalty, elixir
        )
    }
}

fn render_checkin(report: &CheckinReport) -> String {
    format!(
        "签到成功！\n你获得了 {} 灵石和 {} 修为。\n当前灵石 {}，修为 {}。",
        report.gold, report.exp, report.total_gold, report.total_exp
    )
}

fn stat_name(stat: StatKind) -> &'static str {
    match stat {
        StatKind::Attack => "攻击",
        StatKind::Defense => "防御",
        StatKind::MaxHp => "气血上限",
        StatKind::Dodge => "闪避",
        StatKind::Speed => "速度",
    }
}

fn render_use(report: &UseReport) -> String {
    let name = &report.item_name;
    match &report.outcome {
        PlayerEffectOutcome::ExpGained { amount, .. } => {
            format!("你使用了【{}】，一股暖流涌入丹田，修为提升了 {} 点！", name, amount)
        }
        PlayerEffectOutcome::HpRestored { amount, hp } => {
            format!("你服下了【{}】，伤势恢复了 {} 点气血！(当前气血 {})", name, amount, hp)
        }
        PlayerEffectOutcome::StatRaised { stat, value } => format!(
            "你炼化了【{}】，感觉根基更加稳固，{}永久提升了{}点！",
            name,
            stat_name(*stat),
            value
        ),
        PlayerEffectOutcome::SpiritRootChanged { from, to } => format!(
            "你服下了【{}】，洗经伐髓，灵根由【{}灵根】化为【{}灵根】！",
            name,
            from.name(),
            to.name()
        ),
        PlayerEffectOutcome::NoEffect => format!("你使用了【{}】，似乎并无明显变化。", name),
    }
}

fn render_learn(report: &LearnReport) -> String {
    let kind = if report.skill.is_passive() {
        "被动"
    } else {
        "主动"
    };
    format!(
        "你潜心研读，成功领悟了【{}】({}功法)！\n攻击 {} / 防御 {} / 气血上限 {}",
        report.skill.skill_name, kind, report.stats.attack, report.stats.defense, report.stats.max_hp
    )
}

fn render_ranking(kind: RankingKind, entries: &[RankingEntry]) -> String {
    let mut msg = format!("--- {}排行榜 ---\n", kind.title());
    if entries.is_empty() {
        msg.push_str("尚无道友上榜。");
        return msg;
    }
    for e in entries {
        let value = match kind {
            RankingKind::Exp => format!("{} 点修为", e.exp),
            RankingKind::Realm => e.realm_name.clone(),
            RankingKind::Wealth => format!("{} 灵石", e.gold),
        };
        msg.push_str(&format!("第{}名: {} - {}\n", e.rank, e.display_name, value));
    }
    msg
}

fn side_name(report: &DuelReport, side: Side) -> &str {
    match side {
        Side::Challenger => &report.challenger_name,
        Side::Defender => &report.defender_name,
    }
}

fn other(side: Side) -> Side {
    match side {
        Side::Challenger => Side::Defender,
        Side::Defender => Side::Challenger,
    }
}

fn render_duel(report: &DuelReport) -> String {
    let mut log = format!(
        "--- {} vs {} ---\n",
        report.challenger_name, report.defender_name
    );
    for event in &report.result.events {
        let line = match event {
            CombatEvent::Technique { side, skill, outcome } => {
                let who = side_name(report, *side);
                match outcome {
                    CombatEffectOutcome::Fizzled | CombatEffectOutcome::NoEffect => continue,
                    CombatEffectOutcome::Sacrificed { hp_cost } => {
                        format!("{}燃烧{}点气血，施展【{}】！", who, hp_cost, skill)
                    }
                    CombatEffectOutcome::Stunned { rounds } => format!(
                        "{}施展【{}】，{}被定住{}回合！",
                        who,
                        skill,
                        side_name(report, other(*side)),
                        rounds
                    ),
                    CombatEffectOutcome::Resisted => format!(
                        "{}施展【{}】，却被{}化解了。",
                        who,
                        skill,
                        side_name(report, other(*side))
                    ),
                    CombatEffectOutcome::InstantVictory => format!("{}施展【{}】，一击定胜负！", who, skill),
                    _ => format!("{}运转【{}】。", who, skill),
                }
            }
            CombatEvent::Elixir { side, item, outcome } => match outcome {
                CombatEffectOutcome::Buffed => format!("{}服下【{}】，气势大涨！", side_name(report, *side), item),
                _ => format!("{}服下【{}】。", side_name(report, *side), item),
            },
            CombatEvent::Strike {
                round,
                attacker,
                damage,
                remaining_hp,
            } => format!(
                "回合{}: {}对{}造成了{}点伤害！({}剩余{}气血)",
                round,
                side_name(report, *attacker),
                side_name(report, other(*attacker)),
                damage,
                side_name(report, other(*attacker)),
                (*remaining_hp).max(0)
            ),
            CombatEvent::Absorbed { round, defender } => {
                format!("回合{}: {}护体金光一闪，毫发无伤。", round, side_name(report, *defender))
            }
            CombatEvent::Dodged { round, defender } => {
                format!("回合{}: {}身形一晃，躲开了攻击。", round, side_name(report, *defender))
            }
            CombatEvent::Stunned { round, side } => {
                format!("回合{}: {}动弹不得。", round, side_name(report, *side))
            }
            CombatEvent::Reflected { round, side, damage } => format!(
                "回合{}: {}反震{}点伤害。",
                round,
                side_name(report, *side),
                damage
            ),
            CombatEvent::SecondWind { round, side, healed } => format!(
                "回合{}: {}绝境逢生，恢复了{}点气血！",
                round,
                side_name(report, *side),
                healed
            ),
            CombatEvent::Regenerated { round, side, healed } => format!(
                "回合{}: {}恢复了{}点气血。",
                round,
                side_name(report, *side),
                healed
            ),
        };
        log.push_str(&line);
        log.push('\n');
    }

    match report.result.outcome {
        DuelOutcome::Draw => log.push_str("\n双方大战良久，未分胜负，遂罢手言和。"),
        DuelOutcome::Victory { by, .. } => {
            let winner = report.winner().map_or("", |(_, name)| name);
            let loser = report.loser_name().unwrap_or("");
            if by == VictoryKind::Decision {
                log.push_str("\n二十回合已过，双方罢手。");
            }
            log.push_str(&format!(
                "\n战斗结束！【{}】技高一筹，战胜了【{}】！\n并获得了{}灵石作为战利品。",
                winner, loser, report.reward
            ));
        }
    }
    log
}

fn category_label(category: ItemCategory) -> &'static str {
    match category {
        ItemCategory::Elixir => "丹药",
        ItemCategory::SkillBook => "秘籍",
        ItemCategory::Equipment(slot) => slot_name(slot),
    }
}

fn slot_name(slot: EquipmentSlot) -> &'static str {
    match slot {
        EquipmentSlot::Weapon => "武器",
        EquipmentSlot::Armor => "护甲",
        EquipmentSlot::Helmet => "头冠",
        EquipmentSlot::Boots => "靴子",
        EquipmentSlot::Accessory => "饰品",
    }
}

fn render_inventory(lines: &[InventoryLine]) -> String {
    if lines.is_empty() {
        return "你的储物戒空空如也，仿佛被洗劫过一番。".to_string();
    }
    let mut msg = "--- 我的储物戒 ---\n".to_string();
    for line in lines {
        let label = line
            .item
            .as_ref()
            .map(|item| category_label(item.category()))
            .unwrap_or("未知");
        let equipped = if line.entry.equipped { " (已装备)" } else { "" };
        msg.push_str(&format!(
            "【{}】x {} [{}]{}\n",
            line.entry.item_name, line.entry.quantity, label, equipped
        ));
    }
    msg
}

fn render_stat_line(report: &EquipReport) -> String {
    format!(
        "攻击 {} / 防御 {} / 气血 {} / {}",
        report.stats.attack, report.stats.defense, report.stats.hp, report.stats.max_hp
    )
}

fn render_equip(report: &EquipReport) -> String {
    let mut msg = format!(
        "你已成功装备【{}】({})。\n",
        report.item_name,
        slot_name(report.slot)
    );
    if let Some(old) = &report.replaced {
        msg.push_str(&format!("【{}】已卸下放回储物戒。\n", old));
    }
    msg.push_str(&render_stat_line(report));
    msg
}

fn render_shop(items: &[ItemRecord]) -> String {
    let mut msg = "--- 欢迎光临天机阁坊市 ---\n".to_string();
    for item in items {
        msg.push_str(&format!(
            "【{}】[{}] 价格: {} 灵石\n  描述: {}\n",
            item.name,
            category_label(item.category()),
            item.price,
            item.description
        ));
    }
    msg.push_str("\n使用 购买 [物品名称] [数量] 来购买。");
    msg
}

fn render_purchase(report: &PurchaseReport) -> String {
    format!(
        "购买【{}】x{} 成功！花费了 {} 灵石，剩余 {} 灵石。",
        report.item_name, report.quantity, report.cost, report.gold_left
    )
}

fn help_text() -> String {
    [
        "--- 修仙指令 ---",
        "我要修仙 [道号] - 踏入仙途",
        "修仙面板 - 查看自身信息",
        "闭关 / 出关 - 闭关修炼，积累修为",
        "突破 - 尝试突破境界",
        "修仙签到 - 每日签到",
        "使用 [物品] - 服用丹药",
        "学习 [秘籍] - 研读功法秘籍",
        "装备 [物品] / 卸下 [物品] - 穿戴法宝",
        "储物戒 - 查看背包",
        "坊市 / 购买 [物品] [数量] - 买卖物品",
        "切磋 [对方ID] - 与道友切磋",
        "修仙排行 [修为/境界/财富] - 查看排行榜",
        "重置修仙数据 - 删除全部数据（需确认）",
    ]
    .join("\n")
}
